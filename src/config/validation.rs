use crate::config::types::{Config, DetailConfig, FetchConfig, ListingConfig, SiteConfig};
use crate::ConfigError;
use std::path::Path;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_fetch_config(&config.fetch)?;
    validate_listing_config(&config.listing)?;
    validate_detail_config(&config.details)?;
    validate_log_level(&config.logging.level)?;
    Ok(())
}

/// Validates the target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if !config.listing_path.contains("{page}") {
        return Err(ConfigError::Validation(format!(
            "listing_path must contain a {{page}} placeholder, got '{}'",
            config.listing_path
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates retry and transport settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    validate_seconds("base_backoff", config.base_backoff)?;
    validate_seconds("retry_delay", config.retry_delay)?;

    if config.timeout == 0 || config.connect_timeout == 0 {
        return Err(ConfigError::Validation(
            "timeout and connect_timeout must be >= 1 second".to_string(),
        ));
    }

    Ok(())
}

fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    if config.page_count < 1 {
        return Err(ConfigError::Validation(
            "page_count must be >= 1".to_string(),
        ));
    }

    validate_delay_bounds("listing", config.min_delay, config.max_delay)?;
    validate_outputs(
        "listing",
        config.checkpoint_interval,
        &config.output_path,
        &config.checkpoint_path,
    )
}

fn validate_detail_config(config: &DetailConfig) -> Result<(), ConfigError> {
    if config.input_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "details input_path cannot be empty".to_string(),
        ));
    }

    validate_delay_bounds("details", config.min_delay, config.max_delay)?;
    validate_outputs(
        "details",
        config.checkpoint_interval,
        &config.output_path,
        &config.checkpoint_path,
    )
}

/// Pacing bounds must be finite, non-negative, and ordered
fn validate_delay_bounds(phase: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    validate_seconds(&format!("{} min_delay", phase), min)?;
    validate_seconds(&format!("{} max_delay", phase), max)?;

    if min > max {
        return Err(ConfigError::Validation(format!(
            "{} min_delay ({}) must not exceed max_delay ({})",
            phase, min, max
        )));
    }

    Ok(())
}

fn validate_outputs(
    phase: &str,
    checkpoint_interval: usize,
    output_path: &Path,
    checkpoint_path: &Path,
) -> Result<(), ConfigError> {
    if checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "{} checkpoint_interval must be >= 1",
            phase
        )));
    }

    if output_path.as_os_str().is_empty() || checkpoint_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} output_path and checkpoint_path cannot be empty",
            phase
        )));
    }

    if output_path == checkpoint_path {
        return Err(ConfigError::Validation(format!(
            "{} checkpoint_path must differ from output_path ({})",
            phase,
            output_path.display()
        )));
    }

    Ok(())
}

fn validate_seconds(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_log_level(level: &str) -> Result<(), ConfigError> {
    match level.to_ascii_lowercase().as_str() {
        "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "Unknown log level '{}'",
            other
        ))),
    }
}
