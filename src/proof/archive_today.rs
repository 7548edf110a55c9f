//! archive.today submission.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use super::{header_str, ProofError};
use crate::retry::{retry_with_backoff, AttemptError, CooldownKind, RetryPolicy};

static REFRESH_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"url=(https?://[^\s]+)").unwrap());

/// archive.today submit endpoint client.
pub struct ArchiveTodayClient {
    client: Client,
    submit_url: String,
    user_agent: String,
    timeout: Duration,
    policy: RetryPolicy,
}

impl ArchiveTodayClient {
    pub fn new(client: Client, submit_url: &str, user_agent: &str) -> Self {
        Self {
            client,
            submit_url: submit_url.to_string(),
            user_agent: user_agent.to_string(),
            timeout: Duration::from_secs(30),
            policy: Self::default_policy(),
        }
    }

    /// 3 attempts, 3s doubling up to 15s, plus 45s after a 429 or 503.
    pub fn default_policy() -> RetryPolicy {
        RetryPolicy::exponential(3, Duration::from_secs(3), Duration::from_secs(15)).with_cooldown(
            Duration::from_secs(45),
            CooldownKind::Extra,
            &[
                StatusCode::TOO_MANY_REQUESTS.as_u16(),
                StatusCode::SERVICE_UNAVAILABLE.as_u16(),
            ],
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

    async fn attempt(&self, url: &str) -> Result<String, AttemptError<ProofError>> {
        let response = self
            .client
            .post(&self.submit_url)
            .header(USER_AGENT, &self.user_agent)
            .form(&[("url", url)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AttemptError::transient(ProofError::Http(e)))?;

        let status = response.status().as_u16();
        let headers = response.headers();
        if let Some(archived) =
            extract_archive_url(header_str(headers, "location"), header_str(headers, "refresh"))
        {
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
        debug!("Submitting {} to archive.today", url);
        match retry_with_backoff("archive.today submission", &self.policy, |_| self.attempt(url))
            .await
        {
            Ok(archived) => {
                info!("archive.today snapshot: {}", archived);
                Some(archived)
            }
            Err(_) => None,
        }
    }
}

/// Pick the snapshot URL from `location`, falling back to a `refresh` header.
fn extract_archive_url(location: Option<&str>, refresh: Option<&str>) -> Option<String> {
    if let Some(loc) = location.filter(|v| v.contains("archive.")) {
        return Some(loc.to_string());
    }
    let refresh = refresh?;
    REFRESH_URL
        .captures(refresh)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_location() {
        assert_eq!(
            extract_archive_url(Some("https://archive.ph/AbCdE"), None).as_deref(),
            Some("https://archive.ph/AbCdE")
        );
    }

    #[test]
    fn test_extract_from_refresh() {
        assert_eq!(
            extract_archive_url(None, Some("0;url=https://archive.ph/wip/XyZ12")).as_deref(),
            Some("https://archive.ph/wip/XyZ12")
        );
        assert_eq!(
            extract_archive_url(Some("/submit/"), Some("5; url=https://archive.ph/q1 ")).as_deref(),
            Some("https://archive.ph/q1")
        );
    }

    #[test]
    fn test_extract_nothing() {
        assert!(extract_archive_url(Some("https://example.com/"), None).is_none());
        assert!(extract_archive_url(None, Some("5")).is_none());
        assert!(extract_archive_url(None, None).is_none());
    }
}
