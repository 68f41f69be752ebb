//! URL handling module for Critic-Scrape
//!
//! Builds listing page URLs from the configured template and resolves
//! hrefs found on listing pages into absolute item URLs.

use crate::config::SiteConfig;
use crate::state::{Target, TargetSet};
use url::Url;

/// Placeholder replaced by the page number in `listing_path`
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Builds the URL of one listing page
///
/// # Examples
///
/// ```
/// use critic_scrape::config::SiteConfig;
/// use critic_scrape::url::listing_page_url;
///
/// let site = SiteConfig {
///     base_url: "https://example.com".to_string(),
///     listing_path: "/browse/?page={page}".to_string(),
///     ..SiteConfig::default()
/// };
/// let url = listing_page_url(&site, 3).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/browse/?page=3");
/// ```
pub fn listing_page_url(site: &SiteConfig, page: u32) -> Result<Url, url::ParseError> {
    let base = Url::parse(&site.base_url)?;
    let path = site
        .listing_path
        .replace(PAGE_PLACEHOLDER, &page.to_string());
    base.join(&path)
}

/// Targets for listing pages `1..=page_count`, in page order
pub fn listing_targets(site: &SiteConfig, page_count: u32) -> Result<TargetSet, url::ParseError> {
    let targets = (1..=page_count)
        .map(|page| {
            listing_page_url(site, page)
                .map(|url| Target::with_label(url.to_string(), format!("page {}", page)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TargetSet::new(targets))
}

/// Resolves an href to an absolute http(s) URL
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: schemes
/// - anything that does not resolve to http or https
pub fn resolve_href(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
