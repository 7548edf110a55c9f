//! Wayback Machine save-page submission.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use super::{header_str, ProofError};
use crate::retry::{retry_with_backoff, AttemptError, CooldownKind, RetryPolicy};

const WAYBACK_ORIGIN: &str = "https://web.archive.org";

/// Wayback save endpoint client.
pub struct WaybackClient {
    client: Client,
    save_url: String,
    /// Prefix for relative `content-location` paths.
    origin: String,
    timeout: Duration,
    policy: RetryPolicy,
}

impl WaybackClient {
    pub fn new(client: Client, save_url: &str) -> Self {
        let origin = Url::parse(save_url)
            .ok()
            .map(|u| u.origin().ascii_serialization())
            .filter(|o| o != "null")
            .unwrap_or_else(|| WAYBACK_ORIGIN.to_string());

        Self {
            client,
            save_url: save_url.to_string(),
            origin,
            timeout: Duration::from_secs(20),
            policy: Self::default_policy(),
        }
    }

    /// 3 attempts, 2s doubling up to 10s, plus 30s after a 429.
    pub fn default_policy() -> RetryPolicy {
        RetryPolicy::exponential(3, Duration::from_secs(2), Duration::from_secs(10)).with_cooldown(
            Duration::from_secs(30),
            CooldownKind::Extra,
            &[StatusCode::TOO_MANY_REQUESTS.as_u16()],
        )
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extract the snapshot URL from a save response.
    fn archive_url(&self, content_location: Option<&str>, location: Option<&str>) -> Option<String> {
        if let Some(path) = content_location.filter(|v| v.contains("/web/")) {
            return Some(format!("{}{}", self.origin, path));
        }
        location
            .filter(|v| v.contains("web.archive.org"))
            .map(str::to_string)
    }

    async fn attempt(&self, url: &str) -> Result<String, AttemptError<ProofError>> {
        let response = self
            .client
            .get(format!("{}{}", self.save_url, url))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AttemptError::transient(ProofError::Http(e)))?;

        let status = response.status().as_u16();
        let headers = response.headers();
        if let Some(archived) = self.archive_url(
            header_str(headers, "content-location"),
            header_str(headers, "location"),
        ) {
            return Ok(archived);
        }

        if !response.status().is_success() && !response.status().is_redirection() {
            Err(AttemptError::with_status(ProofError::Status(status), status))
        } else {
            Err(AttemptError::with_status(ProofError::MissingArchiveUrl(status), status))
        }
    }

    /// Submit `url`, returning the snapshot URL or `None` once retries run out.
    pub async fn save(&self, url: &str) -> Option<String> {
        debug!("Submitting {} to Wayback", url);
        match retry_with_backoff("Wayback submission", &self.policy, |_| self.attempt(url)).await {
            Ok(archived) => {
                info!("Wayback snapshot: {}", archived);
                Some(archived)
            }
            Err(_) => None,
        }
    }
}
