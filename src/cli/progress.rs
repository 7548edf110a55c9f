//! Progress display for scan runs.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use copyrot::models::SiteStatus;
use copyrot::pipeline::{ScanError, ScanOutcome, ScanProgress, ScanStep};

use super::helpers::truncate;

/// Single progress bar over the target list, with one line per finished URL.
pub struct ScanProgressBar {
    bar: ProgressBar,
}

impl ScanProgressBar {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(progress_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
        {
            bar.set_style(progress_style.progress_chars("█▓░"));
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Print above the bar without tearing it.
    pub fn println(&self, message: impl AsRef<str>) {
        self.bar.println(message);
    }
}

fn status_label(status: SiteStatus) -> String {
    match status {
        SiteStatus::Ok => style("ok").green().to_string(),
        SiteStatus::Stale => style("stale").red().bold().to_string(),
        SiteStatus::Future => style("future").magenta().to_string(),
        SiteStatus::Inconclusive => style("inconclusive").dim().to_string(),
    }
}

impl ScanProgress for ScanProgressBar {
    fn url_started(&self, _index: usize, _total: usize, url: &str) {
        self.bar.set_message(truncate(url, 50));
    }

    fn step(&self, url: &str, step: ScanStep) {
        self.bar
            .set_message(format!("{} {}", truncate(url, 40), style(step.label()).dim()));
    }

    fn url_finished(&self, url: &str, result: Result<&ScanOutcome, &ScanError>) {
        self.bar.inc(1);
        match result {
            Ok(outcome) => {
                let years = outcome
                    .record
                    .detected_years
                    .iter()
                    .map(|y| y.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut line = format!("{} {}", status_label(outcome.record.status), url);
                if !years.is_empty() {
                    line.push_str(&format!(" ({})", years));
                }
                if !outcome.captured {
                    line.push_str(&format!(" {}", style("[no capture]").yellow()));
                }
                if outcome.record.proof_internet_archive.is_some()
                    || outcome.record.proof_archive_today.is_some()
                {
                    line.push_str(&format!(" {}", style("[archived]").cyan()));
                }
                self.println(line);
            }
            Err(e) => {
                self.println(format!("{} {}: {}", style("✗").red(), url, e));
            }
        }
    }
}
