//! Batch scan command.

use std::path::PathBuf;

use anyhow::{bail, Context};
use console::style;

use copyrot::capture::{CaptureError, ScreenshotOneClient};
use copyrot::config::Settings;
use copyrot::ocr::{TesseractRecognizer, TextRecognizer};
use copyrot::pipeline::{parse_targets, shuffle, RunSummary, ScanError, Scanner};
use copyrot::proof::{ArchiveProofs, NoProofs, ProofSubmitter};
use copyrot::repository::SiteRepository;
use copyrot::storage::ScreenshotStore;

use crate::cli::helpers::print_capture_failure;
use crate::cli::progress::ScanProgressBar;

pub struct ScanOptions {
    pub targets: Option<PathBuf>,
    pub limit: Option<usize>,
    pub shuffle: bool,
    pub proofs: bool,
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", style("Scan complete").bold());
    println!("  Processed:    {}", summary.processed);
    println!("  Failed:       {}", summary.failed);
    println!("  Stale:        {}", style(summary.stale).red());
    println!("  OK:           {}", style(summary.ok).green());
    println!("  Future:       {}", summary.future);
    println!("  Inconclusive: {}", summary.inconclusive);
}

/// Scan every target in the list.
pub async fn cmd_scan(settings: &Settings, options: ScanOptions) -> anyhow::Result<()> {
    let capture = match ScreenshotOneClient::new(&settings.capture) {
        Ok(client) => client,
        Err(e) => {
            print_capture_failure(&e);
            return Err(e.into());
        }
    };

    let targets_path = match options.targets {
        Some(path) => path,
        None => settings.resolve_path(&settings.targets),
    };
    let contents = tokio::fs::read_to_string(&targets_path)
        .await
        .with_context(|| format!("Failed to read targets from {}", targets_path.display()))?;

    let mut urls = parse_targets(&contents);
    println!(
        "Found {} valid URLs in {}",
        urls.len(),
        targets_path.display()
    );
    if urls.is_empty() {
        return Ok(());
    }
    if options.shuffle {
        shuffle(&mut urls, &mut rand::thread_rng());
    }
    if let Some(limit) = options.limit {
        urls.truncate(limit);
    }

    let recognizer = TesseractRecognizer::with_settings(&settings.ocr);
    if !recognizer.is_available() {
        bail!(
            "Text recognition unavailable: {}",
            recognizer.availability_hint()
        );
    }

    let proofs: Box<dyn ProofSubmitter> = if options.proofs && settings.proof.enabled {
        Box::new(ArchiveProofs::from_settings(&settings.proof)?)
    } else {
        Box::new(NoProofs)
    };

    let store = ScreenshotStore::new(
        settings.resolve_path(&settings.storage.screenshots_dir),
        &settings.storage.public_base_url,
    );
    let repo = SiteRepository::new(&settings.resolve_path(&settings.storage.database))?;
    let scanner = Scanner::new(
        Box::new(capture),
        Box::new(recognizer),
        proofs,
        store,
        repo,
    );

    println!("Validating capture service access key...");
    if let Err(e) = scanner.validate().await {
        print_capture_failure(&e);
        return Err(preflight_error(e));
    }
    println!("{} Access key validated", style("✓").green());
    println!("Processing {} sites\n", urls.len());

    let progress = ScanProgressBar::new(urls.len());
    let result = scanner.run_batch(&urls, &progress).await;
    progress.finish();

    match result {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(ScanError::Fatal(e)) => {
            print_capture_failure(&e);
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Pre-flight failures always stop the run, whatever their kind.
fn preflight_error(error: CaptureError) -> anyhow::Error {
    match error {
        CaptureError::Request(e) => {
            anyhow::Error::new(e).context("Failed to connect to the capture service")
        }
        other => other.into(),
    }
}
