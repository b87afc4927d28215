//! Core domain types for the NoctiVision monitor.
//!
//! Contains the validation-result model, filter/sort value objects,
//! the bounded deduplicating result cache, and the activity log.
//! This crate performs no I/O.

pub mod activity;
pub mod cache;
pub mod error;
pub mod filter;
pub mod types;

pub use activity::{ActivityKind, ActivityLog, ActivityLogEntry, ACTIVITY_LOG_CAPACITY};
pub use cache::{ResultCache, RESULT_CACHE_CAPACITY};
pub use error::{CoreError, Result};
pub use filter::{FilterState, SortDirection, SortField, SortState};
pub use types::{
    AdminStatus, AssistantContext, AssistantResponse, DomainCount, DomainOverrides, ErrorKind,
    Language, LiveMode, StatsResponse, StatsSeries, StatsSpan, Status, UploadResponse,
    ValidationResult, ViewMode,
};
