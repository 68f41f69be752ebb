use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Desktop browser identity sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Main configuration structure for Critic-Scrape
///
/// Every field has a default, so an empty TOML file (or no file at all)
/// yields a runnable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub fetch: FetchConfig,
    pub listing: ListingConfig,
    pub details: DetailConfig,
    pub logging: LoggingConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Scheme and host that listing hrefs are resolved against
    pub base_url: String,

    /// Path and query of a listing page; `{page}` is replaced by the page number
    pub listing_path: String,

    /// Fixed User-Agent header for all requests
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.metacritic.com".to_string(),
            listing_path: "/browse/game/?releaseYearMin=1958&releaseYearMax=2024&page={page}"
                .to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Retry and transport configuration for the fetcher
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Total attempts per target, including the first
    pub max_retries: u32,

    /// Rate-limit backoff unit in seconds; attempt n waits `base_backoff * n`
    pub base_backoff: f64,

    /// Seconds to wait before retrying a non-429 failure
    pub retry_delay: f64,

    /// Whole-request timeout in seconds
    pub timeout: u64,

    /// Connect timeout in seconds
    pub connect_timeout: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_backoff: 30.0,
            retry_delay: 5.0,
            timeout: 30,
            connect_timeout: 10,
        }
    }
}

impl FetchConfig {
    pub fn base_backoff(&self) -> Duration {
        Duration::from_secs_f64(self.base_backoff)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay)
    }
}

/// Listing-phase configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListingConfig {
    /// Number of listing pages to walk, starting at page 1
    pub page_count: u32,

    /// Lower bound of the pacing delay in seconds
    pub min_delay: f64,

    /// Upper bound of the pacing delay in seconds
    pub max_delay: f64,

    /// Write a checkpoint every this many processed pages
    pub checkpoint_interval: usize,

    /// URL -> label mapping written at the end of the run
    pub output_path: PathBuf,

    /// Periodic snapshot location
    pub checkpoint_path: PathBuf,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_count: 563,
            min_delay: 8.0,
            max_delay: 12.0,
            checkpoint_interval: 100,
            output_path: PathBuf::from("game_links.json"),
            checkpoint_path: PathBuf::from("game_links.checkpoint.json"),
        }
    }
}

/// Detail-phase configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DetailConfig {
    /// URL -> label mapping produced by the listing phase
    pub input_path: PathBuf,

    /// Lower bound of the pacing delay in seconds
    pub min_delay: f64,

    /// Upper bound of the pacing delay in seconds
    pub max_delay: f64,

    /// Write a checkpoint every this many processed items
    pub checkpoint_interval: usize,

    /// Title -> record mapping written at the end of the run
    pub output_path: PathBuf,

    /// Periodic snapshot location
    pub checkpoint_path: PathBuf,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("game_links.json"),
            min_delay: 5.0,
            max_delay: 10.0,
            checkpoint_interval: 100,
            output_path: PathBuf::from("game_info.json"),
            checkpoint_path: PathBuf::from("game_info.checkpoint.json"),
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Base level for this crate: "error", "warn", "info", "debug" or "trace"
    pub level: String,

    /// Persistent log file; `None` disables file output
    pub file: Option<PathBuf>,

    /// Mirror log lines to stderr
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            file: Some(PathBuf::from("scraper.log")),
            console: true,
        }
    }
}
