//! Configuration module for Critic-Scrape
//!
//! Defaults are compiled in; an optional TOML file overrides any subset of
//! them and is validated before a run starts.
//!
//! # Example
//!
//! ```no_run
//! use critic_scrape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scrape.toml")).unwrap();
//! println!("Listing pages: {}", config.listing.page_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DetailConfig, FetchConfig, ListingConfig, LoggingConfig, SiteConfig,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, load_or_default};
pub use validation::validate;
