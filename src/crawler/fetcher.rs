//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the HTTP client with the fixed identity header
//! - Classifying each attempt's failure where it happens
//! - Linear backoff on HTTP 429, fixed delay on other failures
//! - Giving up with a value, never an error, once attempts run out

use crate::config::{FetchConfig, SiteConfig};
use crate::crawler::delay::{Sleeper, TokioSleeper};
use crate::state::{Target, TargetState};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Why a single attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 429
    RateLimited,

    /// Any other non-success status
    Http { status_code: u16 },

    /// Transport failure: connect, timeout, body read
    Network { error: String, timeout: bool },
}

impl FailureKind {
    /// The state a target sits in while waiting to retry after this failure
    pub fn retry_state(&self) -> TargetState {
        match self {
            Self::RateLimited => TargetState::RateLimited,
            _ => TargetState::Failing,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate limited (HTTP 429)"),
            Self::Http { status_code } => write!(f, "HTTP {}", status_code),
            Self::Network { error, timeout: true } => write!(f, "timeout: {}", error),
            Self::Network { error, .. } => write!(f, "network error: {}", error),
        }
    }
}

/// Result of fetching one target, after all retries
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the document
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Document body
        body: String,
        /// Attempts used, including the successful one
        attempts: u32,
        /// How many of those attempts were answered with 429
        rate_limited: u32,
    },

    /// Every attempt failed; the caller skips this target
    GaveUp {
        attempts: u32,
        rate_limited: u32,
        last_failure: FailureKind,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::GaveUp { attempts, .. } => *attempts,
        }
    }

    pub fn rate_limited(&self) -> u32 {
        match self {
            Self::Success { rate_limited, .. } | Self::GaveUp { rate_limited, .. } => {
                *rate_limited
            }
        }
    }
}

/// Attempt budget and delays between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Rate-limit backoff unit
    pub base_backoff: Duration,
    /// Delay before retrying a non-429 failure
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_backoff: config.base_backoff(),
            retry_delay: config.retry_delay(),
        }
    }

    /// Delay after the `attempt`-th attempt (1-based) failed with `failure`
    ///
    /// | Failure | Delay |
    /// |---------|-------|
    /// | HTTP 429 | `base_backoff * attempt` |
    /// | anything else | `retry_delay` |
    pub fn delay_after(&self, attempt: u32, failure: &FailureKind) -> Duration {
        match failure {
            FailureKind::RateLimited => self.base_backoff * attempt,
            _ => self.retry_delay,
        }
    }
}

/// Anything that turns a target into a [`FetchResult`]
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, target: &Target) -> FetchResult;
}

#[async_trait]
impl<T: Fetch + ?Sized> Fetch for &T {
    async fn fetch(&self, target: &Target) -> FetchResult {
        (**self).fetch(target).await
    }
}

/// Builds an HTTP client with the fixed User-Agent and timeouts
///
/// # Example
///
/// ```no_run
/// use critic_scrape::config::{FetchConfig, SiteConfig};
/// use critic_scrape::crawler::build_http_client;
///
/// let client = build_http_client(&SiteConfig::default(), &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(site: &SiteConfig, fetch: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(site.user_agent.as_str())
        .timeout(Duration::from_secs(fetch.timeout))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrying HTTP GET fetcher
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            client,
            policy,
            sleeper,
        }
    }

    /// Builds a fetcher that really sleeps between attempts
    pub fn from_config(site: &SiteConfig, fetch: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(site, fetch)?;
        Ok(Self::new(
            client,
            RetryPolicy::from_config(fetch),
            Arc::new(TokioSleeper),
        ))
    }

    /// One GET, classified
    async fn attempt(&self, url: &str) -> Result<(String, u16, String), FailureKind> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FailureKind::RateLimited);
        }
        if !status.is_success() {
            return Err(FailureKind::Http {
                status_code: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await.map_err(classify_transport_error)?;
        Ok((final_url, status.as_u16(), body))
    }
}

fn classify_transport_error(e: reqwest::Error) -> FailureKind {
    FailureKind::Network {
        timeout: e.is_timeout(),
        error: e.to_string(),
    }
}

#[async_trait]
impl Fetch for Fetcher {
    /// Fetches a target, retrying until it succeeds or the attempt budget is spent
    ///
    /// Every attempt is logged with the target URL and attempt number; every
    /// retry is logged with the delay chosen for it.
    async fn fetch(&self, target: &Target) -> FetchResult {
        let url = target.url();
        let max_attempts = self.policy.max_attempts;
        let mut rate_limited = 0;
        let mut attempt = 1;

        loop {
            tracing::debug!("Fetching {} (attempt {}/{})", url, attempt, max_attempts);

            let failure = match self.attempt(url).await {
                Ok((final_url, status_code, body)) => {
                    tracing::debug!("Fetched {} with HTTP {}", url, status_code);
                    return FetchResult::Success {
                        final_url,
                        status_code,
                        body,
                        attempts: attempt,
                        rate_limited,
                    };
                }
                Err(failure) => failure,
            };

            if failure == FailureKind::RateLimited {
                rate_limited += 1;
            }

            if attempt >= max_attempts {
                tracing::error!(
                    "Max retries exceeded for {} after {} attempts ({}). Skipping.",
                    url,
                    attempt,
                    failure
                );
                return FetchResult::GaveUp {
                    attempts: attempt,
                    rate_limited,
                    last_failure: failure,
                };
            }

            let delay = self.policy.delay_after(attempt, &failure);
            match failure.retry_state() {
                TargetState::RateLimited => tracing::warn!(
                    "Rate-limited on {} (attempt {}). Retrying in {:.1}s",
                    url,
                    attempt,
                    delay.as_secs_f64()
                ),
                _ => tracing::error!(
                    "Failed to fetch {} on attempt {}: {}. Retrying in {:.1}s",
                    url,
                    attempt,
                    failure,
                    delay.as_secs_f64()
                ),
            }

            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }
}
