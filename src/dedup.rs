//! Structural deduplication of post records.
//!
//! Records carry no identifier, so a post is a duplicate only when every field
//! matches a record seen before. A post whose like count changes between
//! passes is therefore kept twice.

use std::collections::HashSet;

use crate::models::PostRecord;

/// Remove duplicate records, keeping the first occurrence of each.
#[must_use]
pub fn dedup(records: Vec<PostRecord>) -> Vec<PostRecord> {
    let mut deduplicator = Deduplicator::new();
    for record in records {
        deduplicator.insert(record);
    }
    deduplicator.into_records()
}

/// Accumulates unique records across extraction passes.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<PostRecord>,
    records: Vec<PostRecord>,
}

impl Deduplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record unless an identical one was already seen.
    ///
    /// Returns `true` if the record was new.
    pub fn insert(&mut self, record: PostRecord) -> bool {
        if self.seen.contains(&record) {
            return false;
        }
        self.seen.insert(record.clone());
        self.records.push(record);
        true
    }

    /// Add every record from an extraction pass, returning how many were new.
    pub fn extend(&mut self, records: impl IntoIterator<Item = PostRecord>) -> usize {
        records
            .into_iter()
            .map(|record| usize::from(self.insert(record)))
            .sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unique records in first-seen order.
    #[must_use]
    pub fn into_records(self) -> Vec<PostRecord> {
        self.records
    }
}
