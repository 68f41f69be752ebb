//! Randomized delay between consecutive targets

use crate::crawler::delay::Sleeper;
use std::sync::Arc;
use std::time::Duration;

/// Spaces requests out by a uniformly random delay in `[min, max]`
///
/// This is separate from the fetcher's backoff: the pacer runs once after
/// every processed target whether or not it was throttled.
#[derive(Clone)]
pub struct Pacer {
    min: Duration,
    max: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl Pacer {
    pub fn new(min: Duration, max: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        // Inverted bounds collapse to `min`
        let max = max.max(min);
        Self { min, max, sleeper }
    }

    /// Builds a pacer from bounds given in seconds
    pub fn from_secs(min: f64, max: f64, sleeper: Arc<dyn Sleeper>) -> Self {
        Self::new(
            Duration::from_secs_f64(min.max(0.0)),
            Duration::from_secs_f64(max.max(0.0)),
            sleeper,
        )
    }

    pub fn bounds(&self) -> (Duration, Duration) {
        (self.min, self.max)
    }

    /// Draws the next delay
    pub fn next_delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let secs = rand::random_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Suspends for a freshly drawn delay
    pub async fn wait(&self) {
        let delay = self.next_delay();
        tracing::debug!("Pausing {:.2}s before the next request", delay.as_secs_f64());
        self.sleeper.sleep(delay).await;
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}
