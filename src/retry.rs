//! Bounded retry with backoff and status-driven cooldowns.
//!
//! Every outbound integration (the capture service and both archives)
//! shares this loop and differs only in its [`RetryPolicy`].

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// How the wait grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Always `base_delay`.
    Fixed,
    /// `base_delay * 2^(attempt - 1)`, capped at `max_delay`.
    Exponential,
}

/// How a cooldown combines with the regular backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownKind {
    /// Waited on top of the backoff.
    Extra,
    /// Waited instead of the backoff.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cooldown {
    pub delay: Duration,
    pub kind: CooldownKind,
    pub statuses: Vec<u16>,
}

/// Retry parameters for one integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff: Backoff,
    pub cooldown: Option<Cooldown>,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            max_delay: delay,
            backoff: Backoff::Fixed,
            cooldown: None,
        }
    }

    pub fn exponential(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            backoff: Backoff::Exponential,
            cooldown: None,
        }
    }

    /// Add a cooldown waited after attempts that failed with one of `statuses`.
    pub fn with_cooldown(mut self, delay: Duration, kind: CooldownKind, statuses: &[u16]) -> Self {
        self.cooldown = Some(Cooldown {
            delay,
            kind,
            statuses: statuses.to_vec(),
        });
        self
    }

    /// Whether a failure with `status` triggers the cooldown.
    pub fn wants_cooldown(&self, status: Option<u16>) -> bool {
        match (&self.cooldown, status) {
            (Some(cooldown), Some(status)) => cooldown.statuses.contains(&status),
            _ => false,
        }
    }

    /// Backoff alone after failed attempt number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.base_delay,
            Backoff::Exponential => {
                let exponent = attempt.saturating_sub(1).min(16);
                self.base_delay
                    .saturating_mul(1u32 << exponent)
                    .min(self.max_delay)
            }
        }
    }

    /// Total wait after failed attempt `attempt` before the next one.
    pub fn delay_after(&self, attempt: u32, status: Option<u16>) -> Duration {
        let backoff = self.backoff_for(attempt);
        match &self.cooldown {
            Some(cooldown) if self.wants_cooldown(status) => match cooldown.kind {
                CooldownKind::Extra => backoff + cooldown.delay,
                CooldownKind::Replace => cooldown.delay,
            },
            _ => backoff,
        }
    }
}

/// Outcome of a single failed attempt.
#[derive(Debug)]
pub enum AttemptError<E> {
    /// Worth retrying. `status` is the HTTP status, if the failure had one.
    Transient { error: E, status: Option<u16> },
    /// Give up immediately.
    Permanent(E),
}

impl<E> AttemptError<E> {
    pub fn transient(error: E) -> Self {
        Self::Transient {
            error,
            status: None,
        }
    }

    pub fn with_status(error: E, status: u16) -> Self {
        Self::Transient {
            error,
            status: Some(status),
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or the policy's
/// attempts are used up. The operation receives the 1-based attempt number.
///
/// No wait follows the final attempt. On exhaustion the last transient
/// error is returned.
pub async fn retry_with_backoff<T, E, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptError<E>>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(AttemptError::Permanent(error)) => {
                debug!("{} failed permanently: {}", label, error);
                return Err(error);
            }
            Err(AttemptError::Transient { error, status }) => {
                if attempt >= max_attempts {
                    warn!("{} failed after {} attempts: {}", label, attempt, error);
                    return Err(error);
                }

                let delay = policy.delay_after(attempt, status);
                if policy.wants_cooldown(status) {
                    warn!(
                        "{} rate limited (HTTP {}), waiting {:?} before attempt {}",
                        label,
                        status.unwrap_or_default(),
                        delay,
                        attempt + 1
                    );
                } else {
                    debug!(
                        "{} attempt {} failed: {}, retrying in {:?}",
                        label, attempt, error, delay
                    );
                }
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
