//! Archival proof submission.
//!
//! A stale page is submitted to two independent web archives so the claim
//! can be checked later against a third-party snapshot. Submissions are
//! best-effort: an archive that keeps failing yields no proof, never an
//! error for the scan.

mod archive_today;
mod wayback;

pub use archive_today::ArchiveTodayClient;
pub use wayback::WaybackClient;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::redirect;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProofSettings;

/// Errors from a single archive submission attempt.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Archive returned HTTP {0}")]
    Status(u16),

    #[error("No archive URL in response headers (HTTP {0})")]
    MissingArchiveUrl(u16),
}

/// Snapshot links produced for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofLinks {
    pub internet_archive: Option<String>,
    pub archive_today: Option<String>,
}

impl ProofLinks {
    pub fn is_empty(&self) -> bool {
        self.internet_archive.is_none() && self.archive_today.is_none()
    }
}

/// Submits pages to web archives.
#[async_trait]
pub trait ProofSubmitter: Send + Sync {
    async fn submit(&self, url: &str) -> ProofLinks;
}

/// Read a header as a string, skipping non-UTF-8 values.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// HTTP client shared by the archive clients. Redirects are never followed:
/// the archive URL is read from the redirect response's headers.
pub fn build_client() -> Result<reqwest::Client, ProofError> {
    Ok(reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()?)
}

/// Wayback Machine and archive.today, submitted concurrently.
pub struct ArchiveProofs {
    wayback: WaybackClient,
    archive_today: ArchiveTodayClient,
}

impl ArchiveProofs {
    pub fn new(wayback: WaybackClient, archive_today: ArchiveTodayClient) -> Self {
        Self {
            wayback,
            archive_today,
        }
    }

    pub fn from_settings(settings: &ProofSettings) -> Result<Self, ProofError> {
        let client = build_client()?;
        Ok(Self::new(
            WaybackClient::new(client.clone(), &settings.wayback_save_url),
            ArchiveTodayClient::new(
                client,
                &settings.archive_today_submit_url,
                &settings.user_agent,
            ),
        ))
    }
}

#[async_trait]
impl ProofSubmitter for ArchiveProofs {
    async fn submit(&self, url: &str) -> ProofLinks {
        let (internet_archive, archive_today) =
            tokio::join!(self.wayback.save(url), self.archive_today.save(url));
        ProofLinks {
            internet_archive,
            archive_today,
        }
    }
}

/// Submitter used when proofs are turned off.
pub struct NoProofs;

#[async_trait]
impl ProofSubmitter for NoProofs {
    async fn submit(&self, url: &str) -> ProofLinks {
        tracing::debug!("Proof capture disabled, skipping {}", url);
        ProofLinks::default()
    }
}
