//! Extraction of structured entries from fetched documents
//!
//! Extractors are pure: they never suspend, perform I/O, or fail. A field
//! the page does not have becomes a placeholder value instead of an error.

mod detail;
mod listing;

pub use detail::{
    extract_record, DetailExtractor, DETAIL_FIELDS, GENRES, METACRITIC_SCORE, PLATFORMS,
    RELEASE_DATE, TITLE, USER_SCORE,
};
pub use listing::{extract_links, ListingExtractor, LISTING_CARD_SELECTOR};

use crate::state::{Entry, MergePolicy, Target};
use scraper::{ElementRef, Html, Selector};

/// Turns one fetched document into keyed entries for the accumulator
pub trait Extractor: Send + Sync {
    type Item: Entry;

    /// Extracts `(natural key, entry)` pairs from `document`, fetched from `target`
    fn extract(&self, target: &Target, document: &str) -> Vec<(String, Self::Item)>;

    /// How an entry whose key is already present is merged
    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::Overwrite
    }
}

/// Trimmed text of the first element matching `selector`, if it has any
pub(crate) fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Trimmed, non-empty text of every element matching `selector`
pub(crate) fn all_texts(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
