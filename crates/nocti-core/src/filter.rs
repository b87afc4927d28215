//! Filter and sort value objects for result queries.
//!
//! These are pure values owned by the state container; the API client
//! reads them to build query strings and never mutates them.

use crate::error::CoreError;
use crate::types::{ErrorKind, Status};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Active result filter.
///
/// Empty/absent fields are omitted from the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Single-status filter (legacy server param, kept alongside `statuses`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Multi-status filter, sent as a comma-joined list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<Status>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_types: Vec<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Free-text query over url/login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_max: Option<u64>,
    /// Inclusive lower date bound, ISO-8601.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    /// Inclusive upper date bound, ISO-8601.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl FilterState {
    /// True when no constraint is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Sortable result columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    LatencyMs,
    Status,
    Login,
    Url,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::LatencyMs => "latency_ms",
            Self::Status => "status",
            Self::Login => "login",
            Self::Url => "url",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "latency_ms" => Ok(Self::LatencyMs),
            "status" => Ok(Self::Status),
            "login" => Ok(Self::Login),
            "url" => Ok(Self::Url),
            other => Err(CoreError::InvalidSortField(other.to_string())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active sort order. Defaults to newest-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort_is_created_at_desc() {
        let sort = SortState::default();
        assert_eq!(sort.field, SortField::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_empty_filter() {
        assert!(FilterState::default().is_empty());

        let filter = FilterState {
            domain: Some("a.com".to_string()),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_sort_field_roundtrip() {
        for field in [
            SortField::CreatedAt,
            SortField::LatencyMs,
            SortField::Status,
            SortField::Login,
            SortField::Url,
        ] {
            assert_eq!(field.as_str().parse::<SortField>().unwrap(), field);
        }
    }
}
