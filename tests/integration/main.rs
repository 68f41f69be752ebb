//! Integration tests against mock HTTP servers
//!
//! These tests use wiremock to stand in for the catalog site and tempfile
//! for output locations, so every phase runs end-to-end without sleeping.

mod crawl_tests;
mod fetch_tests;

use async_trait::async_trait;
use critic_scrape::config::{Config, DetailConfig, FetchConfig, ListingConfig, LoggingConfig, SiteConfig};
use critic_scrape::crawler::Sleeper;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Returns immediately and remembers every requested duration
///
/// The library keeps its own copy for unit tests; that one is compiled
/// only under `cfg(test)` and is not visible from here.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}

/// A configuration pointed at `base_url` with every delay set to zero
/// and every file inside `dir`
pub fn test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            listing_path: "/browse/game/?page={page}".to_string(),
            ..SiteConfig::default()
        },
        fetch: FetchConfig {
            max_retries: 2,
            base_backoff: 0.0,
            retry_delay: 0.0,
            timeout: 5,
            connect_timeout: 5,
        },
        listing: ListingConfig {
            page_count: 2,
            min_delay: 0.0,
            max_delay: 0.0,
            checkpoint_interval: 1,
            output_path: dir.join("game_links.json"),
            checkpoint_path: dir.join("game_links.checkpoint.json"),
        },
        details: DetailConfig {
            input_path: dir.join("game_links.json"),
            min_delay: 0.0,
            max_delay: 0.0,
            checkpoint_interval: 100,
            output_path: dir.join("game_info.json"),
            checkpoint_path: dir.join("game_info.checkpoint.json"),
        },
        logging: LoggingConfig {
            file: None,
            console: false,
            ..LoggingConfig::default()
        },
    }
}
