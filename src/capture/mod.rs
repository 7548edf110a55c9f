//! Full-page capture through an external rendering service.

mod screenshotone;

pub use screenshotone::ScreenshotOneClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConfigError;
use crate::imaging::ImageError;

/// Errors from the capture service.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture service rejected the access key (HTTP 401)")]
    InvalidCredentials,

    #[error("Capture service account limit reached (HTTP 402)")]
    QuotaExhausted,

    #[error("Capture service rate limit hit (HTTP 429)")]
    RateLimited,

    #[error("Capture service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Capture request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Captured image is unusable: {0}")]
    InvalidImage(#[from] ImageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CaptureError {
    /// Errors that will repeat for every URL, so the run should stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::QuotaExhausted)
    }
}

/// A captured full-page screenshot.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// Encoded image as returned by the service (PNG).
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Source of full-page screenshots.
#[async_trait]
pub trait PageCapture: Send + Sync {
    /// Capture `url` as a single full-page image.
    async fn capture(&self, url: &str) -> Result<CaptureResult, CaptureError>;

    /// Check that the credentials work before starting a run.
    async fn validate(&self) -> Result<(), CaptureError> {
        Ok(())
    }
}
