//! Bounded, deduplicating result cache.
//!
//! The materialized view backing the dashboard table. Reconciles bulk
//! pulls (full replacement) with live pushes (front-insert, dedup by id,
//! tail eviction). The capacity bound is structural: the cache is an
//! explicit bounded deque, not a list with post-hoc truncation.

use crate::types::ValidationResult;
use std::collections::VecDeque;

/// Maximum number of cached results.
pub const RESULT_CACHE_CAPACITY: usize = 1000;

/// Ordered, deduplicating, size-capped collection of validation results.
///
/// Index 0 is the newest entry. Memory-only; rebuilt from a bulk pull
/// after restart.
#[derive(Debug, Clone)]
pub struct ResultCache {
    entries: VecDeque<ValidationResult>,
    capacity: usize,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    /// Create a cache with the standard capacity.
    pub fn new() -> Self {
        Self::with_capacity(RESULT_CACHE_CAPACITY)
    }

    /// Create a cache with an explicit capacity (tests, embedding).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(RESULT_CACHE_CAPACITY)),
            capacity,
        }
    }

    /// Replace the full contents after a bulk pull.
    ///
    /// No merge with prior state. Truncates to capacity defensively if the
    /// source returned more rows than the fetch limit should allow.
    pub fn replace_all(&mut self, rows: Vec<ValidationResult>) {
        self.entries = VecDeque::from(rows);
        self.entries.truncate(self.capacity);
    }

    /// Insert one pushed result at the front.
    ///
    /// An existing entry with the same id is removed first — the new row
    /// fully replaces the old, it is not merged field-by-field. The tail
    /// is evicted past capacity.
    pub fn push(&mut self, row: ValidationResult) {
        self.entries.retain(|r| r.id != row.id);
        self.entries.push_front(row);
        self.entries.truncate(self.capacity);
    }

    /// Drop all entries (explicit-empty-on-failure policy).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&ValidationResult> {
        self.entries.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationResult> {
        self.entries.iter()
    }

    /// Cloned view for readers, newest first.
    pub fn snapshot(&self) -> Vec<ValidationResult> {
        self.entries.iter().cloned().collect()
    }
}
