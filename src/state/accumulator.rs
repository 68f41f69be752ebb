//! In-memory collection of everything a run has gathered

use crate::state::record::Entry;
use crate::state::target::Target;
use std::collections::btree_map::Entry as Slot;
use std::collections::{BTreeMap, HashSet};

/// How a new entry is merged when its key is already present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// The existing entry stays; the new one counts as a duplicate
    KeepFirst,
    /// The new entry replaces the existing one
    Overwrite,
}

/// What happened to an entry on insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    Inserted,
    Replaced,
    Kept,
}

/// Mapping from natural key to entry that only grows during a run
///
/// Besides the entries it remembers which target URLs have been
/// collected, so a resumed run can skip them without refetching.
#[derive(Debug, Clone)]
pub struct Accumulator<T> {
    entries: BTreeMap<String, T>,
    sources: HashSet<String>,
}

impl<T> Default for Accumulator<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            sources: HashSet::new(),
        }
    }
}

impl<T: Entry> Accumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an accumulator from previously persisted entries
    pub fn from_entries(entries: BTreeMap<String, T>) -> Self {
        let sources = entries
            .values()
            .flat_map(|entry| entry.sources())
            .map(str::to_string)
            .collect();
        Self { entries, sources }
    }

    /// True when this target was already collected, either by URL key or by recorded source
    pub fn contains_target(&self, target: &Target) -> bool {
        self.sources.contains(target.url()) || self.entries.contains_key(target.url())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Merges one entry under its natural key
    ///
    /// Whichever entry survives a collision takes over the other's sources,
    /// so the targets behind both stay collected after a save and reload.
    pub fn insert(&mut self, key: String, entry: T, policy: MergePolicy) -> Merge {
        self.sources
            .extend(entry.sources().into_iter().map(str::to_string));

        match (self.entries.entry(key), policy) {
            (Slot::Vacant(slot), _) => {
                slot.insert(entry);
                Merge::Inserted
            }
            (Slot::Occupied(mut slot), MergePolicy::KeepFirst) => {
                slot.get_mut().absorb_sources(&entry);
                Merge::Kept
            }
            (Slot::Occupied(mut slot), MergePolicy::Overwrite) => {
                let mut entry = entry;
                entry.absorb_sources(slot.get());
                slot.insert(entry);
                Merge::Replaced
            }
        }
    }

    /// Records a target as collected even if it produced no entries
    pub fn mark_collected(&mut self, target: &Target) {
        self.sources.insert(target.url().to_string());
    }

    /// Folds another accumulator in, its entries winning on conflict
    pub fn absorb(&mut self, other: Accumulator<T>) {
        self.sources.extend(other.sources);
        self.entries.extend(other.entries);
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> &BTreeMap<String, T> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
