//! Suspension points
//!
//! The fetcher's retry backoff and the pacer's inter-request delay both
//! suspend through [`Sleeper`], so tests can record durations instead of
//! waiting them out.

use async_trait::async_trait;
use std::time::Duration;

/// Something that can suspend the current task for a duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Returns immediately and remembers every requested duration
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSleeper {
    calls: std::sync::Arc<std::sync::Mutex<Vec<Duration>>>,
}

#[cfg(test)]
impl RecordingSleeper {
    pub(crate) fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}
