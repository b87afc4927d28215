//! Operator-visible activity log.
//!
//! Capped ring buffer, newest first, oldest evicted past the cap.
//! Entries are never mutated; destroyed only by eviction or explicit
//! clear.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Maximum number of retained log entries.
pub const ACTIVITY_LOG_CAPACITY: usize = 100;

/// Category of an activity-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Upload,
    Worker,
    Result,
    Admin,
    Error,
    Info,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Worker => "worker",
            Self::Result => "result",
            Self::Admin => "admin",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit trail item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Bounded audit trail, insertion-order-descending.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityLogEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(ACTIVITY_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, assigning a fresh id and the current timestamp.
    ///
    /// Returns the assigned entry id.
    pub fn push(&mut self, kind: ActivityKind, message: impl Into<String>) -> Uuid {
        self.push_with_details(kind, message, None)
    }

    /// Append an entry carrying structured details.
    pub fn push_with_details(
        &mut self,
        kind: ActivityKind,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.push_front(ActivityLogEntry {
            id,
            timestamp: Utc::now(),
            kind,
            message: message.into(),
            details,
        });
        self.entries.truncate(self.capacity);
        id
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityLogEntry> {
        self.entries.iter()
    }

    /// Cloned view for readers, newest first.
    pub fn snapshot(&self) -> Vec<ActivityLogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Count of entries of a given kind.
    pub fn count_of(&self, kind: ActivityKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }
}
