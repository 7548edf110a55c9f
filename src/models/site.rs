//! Site records: one row per scanned host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ZoomCoordinates;

/// Classification of a site's copyright claim relative to the calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    /// Footer shows the current year.
    Ok,
    /// Footer shows a year older than the current one.
    Stale,
    /// No year could be located.
    Inconclusive,
    /// Footer claims a year after the current one.
    Future,
}

impl SiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Ok => "ok",
            SiteStatus::Stale => "stale",
            SiteStatus::Inconclusive => "inconclusive",
            SiteStatus::Future => "future",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ok" => Some(SiteStatus::Ok),
            "stale" => Some(SiteStatus::Stale),
            "inconclusive" => Some(SiteStatus::Inconclusive),
            "future" => Some(SiteStatus::Future),
            _ => None,
        }
    }
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted result of scanning one site, keyed by `slug`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub url: String,
    pub slug: String,
    pub detected_years: Vec<i32>,
    pub current_year: i32,
    pub status: SiteStatus,
    pub screenshot_url: Option<String>,
    pub screenshot_hash: Option<String>,
    pub zoom_screenshot_url: Option<String>,
    pub zoom_screenshot_hash: Option<String>,
    pub zoom_coordinates: Option<ZoomCoordinates>,
    pub proof_internet_archive: Option<String>,
    pub proof_archive_today: Option<String>,
    pub first_incorrect_at: Option<DateTime<Utc>>,
    pub last_incorrect_at: Option<DateTime<Utc>>,
    pub last_correct_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl SiteRecord {
    /// Create a record for a fresh scan with no artifacts attached yet.
    pub fn new(
        url: impl Into<String>,
        slug: impl Into<String>,
        detected_years: Vec<i32>,
        current_year: i32,
        status: SiteStatus,
    ) -> Self {
        Self {
            url: url.into(),
            slug: slug.into(),
            detected_years,
            current_year,
            status,
            screenshot_url: None,
            screenshot_hash: None,
            zoom_screenshot_url: None,
            zoom_screenshot_hash: None,
            zoom_coordinates: None,
            proof_internet_archive: None,
            proof_archive_today: None,
            first_incorrect_at: None,
            last_incorrect_at: None,
            last_correct_at: None,
            verified_at: None,
            last_checked_at: None,
        }
    }

    /// Stamp the scan-time fields for this record's status.
    ///
    /// `first_incorrect_at` is always proposed on a stale scan; the repository
    /// keeps whichever value was stored first.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        self.last_checked_at = Some(now);
        match self.status {
            SiteStatus::Ok => {
                self.last_correct_at = Some(now);
            }
            SiteStatus::Stale => {
                self.last_incorrect_at = Some(now);
                self.verified_at = Some(now);
                self.first_incorrect_at = Some(now);
            }
            SiteStatus::Inconclusive | SiteStatus::Future => {}
        }
    }
}
