//! Shared helper functions for CLI commands.

use console::style;

use copyrot::capture::CaptureError;

/// Truncate to `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Explain a capture failure that stops the run and how to fix it.
pub fn print_capture_failure(error: &CaptureError) {
    eprintln!("{} {}", style("✗").red(), style(error).red().bold());
    if error.is_fatal() || matches!(error, CaptureError::Config(_)) {
        eprintln!();
        eprintln!("Exiting: the capture service cannot be used. Please ensure:");
        eprintln!("  1. Your SCREENSHOTONE_ACCESS_KEY is correct");
        eprintln!("  2. Your account has remaining credits");
        eprintln!("  3. The access key has not expired");
    }
}
