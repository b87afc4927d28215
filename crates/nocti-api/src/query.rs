//! Query-string parameter building.
//!
//! Absent and empty values are omitted entirely; the server treats a
//! missing key and an empty key differently for some filters, so the
//! client never sends empty strings.

use nocti_core::{FilterState, SortState};

/// Ordered key/value pairs for a request query string.
///
/// Encoding is left to the HTTP client; this type only decides which
/// pairs appear.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair, skipping empty values.
    pub fn push(&mut self, key: &str, value: impl AsRef<str>) -> &mut Self {
        let value = value.as_ref();
        if !value.is_empty() {
            self.pairs.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// Add an optional pair; `None` is skipped.
    pub fn push_opt<T: ToString>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value.to_string());
        }
        self
    }

    /// Add one pair per value under the same key (repeated-key lists).
    pub fn push_each<I, T>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for value in values {
            self.push(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in insertion order, ready for `RequestBuilder::query`.
    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Build the shared filter/sort parameter set for result queries.
///
/// Matches the server's `/results` and `/results/export` conventions:
/// `statuses` is comma-joined, sort travels as `sort` + `dir`.
pub fn result_params(filters: &FilterState, sort: &SortState, limit: usize) -> QueryParams {
    let mut params = QueryParams::new();
    params.push("limit", limit.to_string());
    params.push_opt("status", filters.status.map(|s| s.to_string()));
    if !filters.statuses.is_empty() {
        let joined = filters
            .statuses
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",");
        params.push("statuses", joined);
    }
    params.push_opt("domain", filters.domain.clone());
    params.push_opt("q", filters.query.clone());
    params.push("sort", sort.field.as_str());
    params.push("dir", sort.direction.as_str());
    params.push_opt("latency_min", filters.latency_min);
    params.push_opt("latency_max", filters.latency_max);
    params.push_opt("date_from", filters.date_from.clone());
    params.push_opt("date_to", filters.date_to.clone());
    params
}
