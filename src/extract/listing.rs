//! Listing page extraction: item URL -> display label

use crate::extract::{element_text, Extractor};
use crate::state::{MergePolicy, Target};
use crate::url::resolve_href;
use scraper::{Html, Selector};
use url::Url;

/// Product cards on a catalog listing page
pub const LISTING_CARD_SELECTOR: &str = "a.c-finderProductCard_container.g-color-gray80.u-grid";

/// Extracts every product card link from a listing page
///
/// Hrefs are resolved against `base_url`; cards without a usable href are
/// dropped. Order follows the page.
///
/// # Example
///
/// ```
/// use critic_scrape::extract::extract_links;
/// use url::Url;
///
/// let html = r#"<a class="c-finderProductCard_container g-color-gray80 u-grid" href="/game/halo/">Halo</a>"#;
/// let base = Url::parse("https://www.example.com").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links, vec![("https://www.example.com/game/halo/".to_string(), "Halo".to_string())]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(LISTING_CARD_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let url = resolve_href(href, base_url)?;
            Some((url, element_text(anchor)))
        })
        .collect()
}

/// Listing-phase extractor
///
/// Keys are item URLs; a URL seen again keeps its first label.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    base_url: Url,
}

impl ListingExtractor {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl Extractor for ListingExtractor {
    type Item = String;

    fn extract(&self, _target: &Target, document: &str) -> Vec<(String, String)> {
        extract_links(document, &self.base_url)
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::KeepFirst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://www.example.com").unwrap()
    }

    fn card(href: &str, label: &str) -> String {
        format!(
            r#"<a class="c-finderProductCard_container g-color-gray80 u-grid" href="{}">
                <span>{}</span>
            </a>"#,
            href, label
        )
    }

    #[test]
    fn test_extracts_cards_in_page_order() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            card("/game/b/", "Bravo"),
            card("/game/a/", "Alpha")
        );
        let links = extract_links(&html, &base_url());
        assert_eq!(
            links,
            vec![
                ("https://www.example.com/game/b/".to_string(), "Bravo".to_string()),
                ("https://www.example.com/game/a/".to_string(), "Alpha".to_string()),
            ]
        );
    }

    #[test]
    fn test_ignores_other_anchors() {
        let html = r#"
            <html><body>
                <a class="c-finderProductCard_container" href="/game/partial/">Partial</a>
                <a href="/about">About</a>
            </body></html>
        "#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_card_without_href_is_dropped() {
        let html = r#"<a class="c-finderProductCard_container g-color-gray80 u-grid">No link</a>"#;
        assert!(extract_links(html, &base_url()).is_empty());
    }

    #[test]
    fn test_empty_page() {
        assert!(extract_links("<html><body></body></html>", &base_url()).is_empty());
    }

    #[test]
    fn test_extractor_keeps_first_label() {
        let extractor = ListingExtractor::new(base_url());
        assert_eq!(extractor.merge_policy(), MergePolicy::KeepFirst);

        let entries = extractor.extract(&Target::new("https://www.example.com/browse?page=1"), &card("/game/x/", "X"));
        assert_eq!(entries.len(), 1);
    }
}
