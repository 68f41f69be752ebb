//! Targets and the immutable, deduplicated set a run iterates over

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// One URL to fetch, with the display label it was discovered under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    url: String,
    label: Option<String>,
}

impl Target {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: None,
        }
    }

    pub fn with_label(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: Some(label.into()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Ordered set of targets, deduplicated by URL
///
/// The first occurrence of a URL fixes its position. The set cannot be
/// modified once built, so a run always sees the same targets.
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    /// Builds a set from targets in input order, dropping repeated URLs
    pub fn new(targets: impl IntoIterator<Item = Target>) -> Self {
        let mut seen = HashSet::new();
        let targets = targets
            .into_iter()
            .filter(|target| seen.insert(target.url.clone()))
            .collect();
        Self { targets }
    }

    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(urls.into_iter().map(Target::new))
    }

    /// Builds a set from a URL -> label mapping as written by the listing phase
    ///
    /// Non-string labels are kept as their JSON text.
    pub fn from_mapping(mapping: &Map<String, Value>) -> Self {
        Self::new(mapping.iter().map(|(url, label)| match label {
            Value::String(label) => Target::with_label(url.clone(), label.clone()),
            Value::Null => Target::new(url.clone()),
            other => Target::with_label(url.clone(), other.to_string()),
        }))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
