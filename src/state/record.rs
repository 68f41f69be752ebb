//! Extracted records and the values they hold

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder for a missing title
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Placeholder for a missing release date
pub const UNKNOWN_RELEASE_DATE: &str = "Unknown Release Date";

/// Placeholder for a missing critic or user score
pub const UNKNOWN_SCORE: &str = "Unknown Score";

const SENTINELS: [&str; 3] = [UNKNOWN_TITLE, UNKNOWN_RELEASE_DATE, UNKNOWN_SCORE];

/// A single field of a record
///
/// On disk a value is a JSON string or array of strings. Strings equal to
/// one of the placeholders load back as [`FieldValue::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFieldValue", into = "RawFieldValue")]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Unknown(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawFieldValue {
    Text(String),
    List(Vec<String>),
}

impl From<RawFieldValue> for FieldValue {
    fn from(raw: RawFieldValue) -> Self {
        match raw {
            RawFieldValue::Text(text) if SENTINELS.contains(&text.as_str()) => {
                FieldValue::Unknown(text)
            }
            RawFieldValue::Text(text) => FieldValue::Text(text),
            RawFieldValue::List(items) => FieldValue::List(items),
        }
    }
}

impl From<FieldValue> for RawFieldValue {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Text(text) | FieldValue::Unknown(text) => RawFieldValue::Text(text),
            FieldValue::List(items) => RawFieldValue::List(items),
        }
    }
}

impl FieldValue {
    pub fn unknown(sentinel: &str) -> Self {
        FieldValue::Unknown(sentinel.to_string())
    }

    /// Text for a single-valued field, or the placeholder when nothing was found
    pub fn text_or(text: Option<String>, sentinel: &str) -> Self {
        match text {
            Some(text) => FieldValue::Text(text),
            None => FieldValue::unknown(sentinel),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, FieldValue::Unknown(_))
    }

    /// The string form of a text or placeholder value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) | FieldValue::Unknown(text) => Some(text),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Flat mapping of field name to value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Name of the field holding the URL a record was scraped from
pub const SOURCE_FIELD: &str = "url";

/// Name of the field listing URLs whose records were replaced by this one
pub const MERGED_SOURCES_FIELD: &str = "merged_urls";

/// Something that can be stored in an [`Accumulator`](crate::state::Accumulator)
pub trait Entry: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// URLs of the targets this entry stands for, when the entry records them
    fn sources(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Takes over the sources of an entry dropped in a key collision
    fn absorb_sources(&mut self, _dropped: &Self) {}
}

/// Listing labels carry no source; the listing key is the URL itself
impl Entry for String {}

impl Entry for Record {
    fn sources(&self) -> Vec<&str> {
        let own = match self.get(SOURCE_FIELD) {
            Some(FieldValue::Text(url)) => Some(url.as_str()),
            _ => None,
        };
        let merged = self
            .get(MERGED_SOURCES_FIELD)
            .and_then(FieldValue::as_list)
            .unwrap_or_default();

        own.into_iter()
            .chain(merged.iter().map(String::as_str))
            .collect()
    }

    fn absorb_sources(&mut self, dropped: &Self) {
        let own: Vec<String> = self.sources().into_iter().map(str::to_string).collect();
        let mut merged: Vec<String> = self
            .get(MERGED_SOURCES_FIELD)
            .and_then(FieldValue::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        for url in dropped.sources() {
            if !own.iter().any(|known| known == url) && !merged.iter().any(|known| known == url) {
                merged.push(url.to_string());
            }
        }

        if !merged.is_empty() {
            self.insert(MERGED_SOURCES_FIELD, FieldValue::List(merged));
        }
    }
}
