//! Capture credential validation.

use console::style;

use copyrot::capture::{PageCapture, ScreenshotOneClient};
use copyrot::config::Settings;

use crate::cli::helpers::print_capture_failure;

/// Validate the access key with a small test capture.
pub async fn cmd_check_key(settings: &Settings) -> anyhow::Result<()> {
    println!("Validating capture service access key...");

    let result = match ScreenshotOneClient::new(&settings.capture) {
        Ok(client) => client.validate().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            println!("{} Access key validated", style("✓").green());
            Ok(())
        }
        Err(e) => {
            print_capture_failure(&e);
            Err(e.into())
        }
    }
}
