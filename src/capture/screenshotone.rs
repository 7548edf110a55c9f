//! ScreenshotOne capture client.
//!
//! One high-density full-page capture per URL, stitched by sections with a
//! scroll pass so lazy-loaded footers render. Ads, cookie banners and chat
//! widgets are blocked so they don't cover the footer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use super::{CaptureError, CaptureResult, PageCapture};
use crate::config::CaptureSettings;
use crate::imaging::read_dimensions;
use crate::retry::{retry_with_backoff, AttemptError, CooldownKind, RetryPolicy};

/// Page used to validate credentials.
const VALIDATION_URL: &str = "https://example.com";
const VALIDATION_VIEWPORT_WIDTH: u32 = 1280;

pub struct ScreenshotOneClient {
    client: Client,
    settings: CaptureSettings,
    access_key: String,
}

impl ScreenshotOneClient {
    /// Build a client. Fails if no access key is configured.
    pub fn new(settings: &CaptureSettings) -> Result<Self, CaptureError> {
        let access_key = settings.require_access_key()?.to_string();
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            settings: settings.clone(),
            access_key,
        })
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.settings.max_attempts,
            Duration::from_secs(self.settings.retry_delay_secs),
        )
        .with_cooldown(
            Duration::from_secs(self.settings.rate_limit_delay_secs),
            CooldownKind::Replace,
            &[StatusCode::TOO_MANY_REQUESTS.as_u16()],
        )
    }

    /// Query parameters for a full-page capture of `url`.
    pub fn capture_params(&self, url: &str) -> Vec<(&'static str, String)> {
        let s = &self.settings;
        vec![
            ("access_key", self.access_key.clone()),
            ("url", url.to_string()),
            ("viewport_width", s.viewport_width.to_string()),
            ("viewport_height", s.viewport_height.to_string()),
            ("full_page", "true".to_string()),
            ("full_page_algorithm", "by_sections".to_string()),
            ("full_page_scroll", "true".to_string()),
            ("full_page_scroll_delay", s.scroll_delay_ms.to_string()),
            ("device_scale_factor", s.device_scale_factor.to_string()),
            ("block_cookie_banners", "true".to_string()),
            ("block_ads", "true".to_string()),
            ("block_chats", "true".to_string()),
            ("cache", "false".to_string()),
            ("format", "png".to_string()),
            ("delay", s.delay_secs.to_string()),
            ("wait_until", "networkidle2".to_string()),
            ("timeout", s.render_timeout_secs.to_string()),
        ]
    }

    async fn fetch_once(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<Vec<u8>, AttemptError<CaptureError>> {
        let response = self
            .client
            .get(&self.settings.api_url)
            .query(params)
            .timeout(Duration::from_secs(self.settings.request_timeout_secs))
            .send()
            .await
            .map_err(|e| AttemptError::transient(CaptureError::Request(e)))?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => Err(AttemptError::Permanent(CaptureError::InvalidCredentials)),
            StatusCode::PAYMENT_REQUIRED => Err(AttemptError::Permanent(CaptureError::QuotaExhausted)),
            StatusCode::TOO_MANY_REQUESTS => Err(AttemptError::with_status(
                CaptureError::RateLimited,
                status.as_u16(),
            )),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(AttemptError::with_status(
                    CaptureError::Status {
                        status: s.as_u16(),
                        body,
                    },
                    s.as_u16(),
                ))
            }
            _ => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| AttemptError::transient(CaptureError::Request(e))),
        }
    }
}

#[async_trait]
impl PageCapture for ScreenshotOneClient {
    async fn capture(&self, url: &str) -> Result<CaptureResult, CaptureError> {
        let params = self.capture_params(url);
        let label = format!("Capture of {}", url);

        let bytes =
            retry_with_backoff(&label, &self.retry_policy(), |_| self.fetch_once(&params)).await?;
        let dims = read_dimensions(&bytes)?;

        info!(
            "Captured {} ({}x{}, {} bytes)",
            url,
            dims.width,
            dims.height,
            bytes.len()
        );
        Ok(CaptureResult {
            bytes,
            width: dims.width,
            height: dims.height,
        })
    }

    async fn validate(&self) -> Result<(), CaptureError> {
        debug!("Validating capture service access key");
        let response = self
            .client
            .get(&self.settings.api_url)
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("url", VALIDATION_URL),
                ("viewport_width", &VALIDATION_VIEWPORT_WIDTH.to_string()),
                ("format", "png"),
            ])
            .timeout(Duration::from_secs(self.settings.validation_timeout_secs))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(CaptureError::InvalidCredentials),
            StatusCode::PAYMENT_REQUIRED => Err(CaptureError::QuotaExhausted),
            s if s.is_success() => Ok(()),
            s => Err(CaptureError::Status {
                status: s.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    fn settings() -> CaptureSettings {
        CaptureSettings {
            access_key: Some("key".to_string()),
            ..CaptureSettings::default()
        }
    }

    #[test]
    fn test_requires_access_key() {
        let result = ScreenshotOneClient::new(&CaptureSettings::default());
        assert!(matches!(
            result,
            Err(CaptureError::Config(ConfigError::MissingAccessKey))
        ));
    }

    #[test]
    fn test_capture_params() {
        let client = ScreenshotOneClient::new(&settings()).unwrap();
        let params = client.capture_params("https://acme.test/");
        let get = |name: &str| {
            params
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("url"), Some("https://acme.test/"));
        assert_eq!(get("viewport_width"), Some("1920"));
        assert_eq!(get("viewport_height"), Some("1080"));
        assert_eq!(get("device_scale_factor"), Some("2"));
        assert_eq!(get("full_page_algorithm"), Some("by_sections"));
        assert_eq!(get("full_page_scroll_delay"), Some("400"));
        assert_eq!(get("wait_until"), Some("networkidle2"));
        assert_eq!(get("format"), Some("png"));
        assert_eq!(get("cache"), Some("false"));
        assert_eq!(get("timeout"), Some("60"));
    }

    #[test]
    fn test_retry_policy() {
        let client = ScreenshotOneClient::new(&settings()).unwrap();
        let policy = client.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_after(1, Some(500)), Duration::from_secs(2));
        assert_eq!(policy.delay_after(1, Some(429)), Duration::from_secs(10));
    }
}
