//! Item detail page extraction

use crate::extract::{all_texts, first_text, Extractor};
use crate::state::{
    FieldValue, Record, Target, SOURCE_FIELD, UNKNOWN_RELEASE_DATE, UNKNOWN_SCORE, UNKNOWN_TITLE,
};
use scraper::{Html, Selector};

pub const TITLE: &str = "title";
pub const PLATFORMS: &str = "platforms";
pub const RELEASE_DATE: &str = "release_date";
pub const GENRES: &str = "genres";
pub const METACRITIC_SCORE: &str = "metacritic_score";
pub const USER_SCORE: &str = "user_score";

/// Every field [`extract_record`] sets, whatever the page contains
pub const DETAIL_FIELDS: [&str; 6] = [
    TITLE,
    PLATFORMS,
    RELEASE_DATE,
    GENRES,
    METACRITIC_SCORE,
    USER_SCORE,
];

const TITLE_SELECTOR: &str = r#"div[data-testid="hero-title"] h1"#;
const PLATFORM_SELECTOR: &str = r#"a.c-gamePlatformTileLink[href*="platform="]"#;
const RELEASE_DATE_SELECTOR: &str = "div.g-text-xsmall span.u-text-uppercase";
const GENRE_SELECTOR: &str = "ul.c-genreList li a span.c-globalButton_label";
const METASCORE_SELECTOR: &str = "div.c-siteReviewScore_background-critic_medium span";
const USER_SCORE_SELECTOR: &str = "div.c-siteReviewScore_background-user span";

/// Extracts an item record from a detail page
///
/// Each field is extracted on its own: single-valued fields take the first
/// match or their placeholder, list fields take every match or stay empty.
pub fn extract_record(html: &str) -> Record {
    let document = Html::parse_document(html);
    let mut record = Record::new();

    record.insert(
        TITLE,
        FieldValue::text_or(first_text(&document, TITLE_SELECTOR), UNKNOWN_TITLE),
    );
    record.insert(PLATFORMS, FieldValue::List(extract_platforms(&document)));
    record.insert(
        RELEASE_DATE,
        FieldValue::text_or(
            first_text(&document, RELEASE_DATE_SELECTOR),
            UNKNOWN_RELEASE_DATE,
        ),
    );
    record.insert(GENRES, FieldValue::List(all_texts(&document, GENRE_SELECTOR)));
    record.insert(
        METACRITIC_SCORE,
        FieldValue::text_or(first_text(&document, METASCORE_SELECTOR), UNKNOWN_SCORE),
    );
    record.insert(
        USER_SCORE,
        FieldValue::text_or(first_text(&document, USER_SCORE_SELECTOR), UNKNOWN_SCORE),
    );

    record
}

/// Platform names are the value of the `platform=` query parameter on each tile link
fn extract_platforms(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(PLATFORM_SELECTOR) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|tile| tile.value().attr("href"))
        .filter_map(|href| href.rsplit("platform=").next())
        .map(|platform| platform.trim().to_string())
        .filter(|platform| !platform.is_empty())
        .collect()
}

/// Detail-phase extractor
///
/// The natural key is the title. Records also carry the URL they came from,
/// and two pages with the same title leave only the later record.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailExtractor;

impl Extractor for DetailExtractor {
    type Item = Record;

    fn extract(&self, target: &Target, document: &str) -> Vec<(String, Record)> {
        let mut record = extract_record(document);
        record.insert(SOURCE_FIELD, FieldValue::Text(target.url().to_string()));

        let key = record
            .get(TITLE)
            .and_then(FieldValue::as_text)
            .unwrap_or(UNKNOWN_TITLE)
            .to_string();

        vec![(key, record)]
    }
}
