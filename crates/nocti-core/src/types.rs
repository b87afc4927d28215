//! Wire and domain types for the validation service API.
//!
//! Field names follow the server's snake_case JSON. Enums round-trip
//! through their lowercase string forms for both wire payloads and
//! settings persistence.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Outcome of one credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Valid,
    Invalid,
    Captcha,
    Mfa,
    Error,
}

impl Status {
    /// All statuses, in display order.
    pub const ALL: [Status; 5] = [
        Status::Valid,
        Status::Invalid,
        Status::Captcha,
        Status::Mfa,
        Status::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Captcha => "captcha",
            Self::Mfa => "mfa",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "valid" => Ok(Self::Valid),
            "invalid" => Ok(Self::Invalid),
            "captcha" => Ok(Self::Captcha),
            "mfa" => Ok(Self::Mfa),
            "error" => Ok(Self::Error),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

/// Error subtype attached to `Status::Error` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Dns,
    Tls,
    Timeout,
    Waf,
    Captcha,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dns => "dns",
            Self::Tls => "tls",
            Self::Timeout => "timeout",
            Self::Waf => "waf",
            Self::Captcha => "captcha",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI language preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Uz,
    #[default]
    En,
    Ru,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uz => "uz",
            Self::En => "en",
            Self::Ru => "ru",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uz" => Ok(Self::Uz),
            "en" => Ok(Self::En),
            "ru" => Ok(Self::Ru),
            other => Err(CoreError::InvalidLanguage(other.to_string())),
        }
    }
}

/// Dashboard density mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Basic,
    Expert,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Expert => "expert",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "expert" => Ok(Self::Expert),
            other => Err(CoreError::InvalidViewMode(other.to_string())),
        }
    }
}

/// Live-connection preference.
///
/// `Auto` attempts WebSocket first and falls back to SSE; the fallback is
/// one-directional within a mode session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveMode {
    #[default]
    Auto,
    Ws,
    Sse,
    Off,
}

impl LiveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Ws => "ws",
            Self::Sse => "sse",
            Self::Off => "off",
        }
    }
}

impl std::fmt::Display for LiveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LiveMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "ws" => Ok(Self::Ws),
            "sse" => Ok(Self::Sse),
            "off" => Ok(Self::Off),
            other => Err(CoreError::InvalidLiveMode(other.to_string())),
        }
    }
}

/// One observed credential-check outcome.
///
/// Created by the validation service; arrives via bulk pull or live push.
/// Never mutated in place — a push with a pre-existing id replaces the
/// old entry positionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Unique identifier within the cache.
    pub id: String,
    /// Target URL that was checked.
    pub url: String,
    /// Login identifier.
    pub login: String,
    /// Plaintext password, present only when the server reveals it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Masked password for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_masked: Option<String>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Creation timestamp, ISO-8601.
    pub created_at: String,
    /// Domain derived from `url`.
    pub domain: String,
}

/// Response to a credential-list upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Lines accepted into the queue.
    pub accepted: u64,
    /// Lines dropped as duplicates.
    pub deduped: u64,
}

/// Worker/queue status from the authenticated admin surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStatus {
    pub ok: bool,
    pub workers_total: u32,
    pub workers_alive: u32,
    pub paused: bool,
    pub running: bool,
    /// Target worker count.
    pub target: u32,
    pub accept_uploads: bool,
    pub queue_size: u64,
}

/// Per-domain concurrency overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainOverrides {
    pub ok: bool,
    /// Domain -> concurrency limit.
    pub overrides: HashMap<String, u32>,
}

/// Aggregate statistics window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub ok: bool,
    pub window_minutes: u32,
    pub total: u64,
    pub by_status: HashMap<Status, u64>,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p75_latency_ms: f64,
    pub p90_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub span: StatsSpan,
    pub rate_per_min: f64,
    pub top_error_domains: Vec<DomainCount>,
    /// Current queue depth.
    pub queue: u64,
    pub series: StatsSeries,
    /// Server-side timestamp of the snapshot, ISO-8601.
    pub now: String,
}

/// Time span covered by a stats window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSpan {
    pub from: String,
    pub to: String,
}

/// Domain with an error count, for top-error rankings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: u64,
}

/// Per-bucket time series for the stats window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSeries {
    pub points: Vec<u64>,
    pub errors: Vec<u64>,
    pub valid: Vec<u64>,
    pub invalid: Vec<u64>,
    pub captcha: Vec<u64>,
    pub mfa: Vec<u64>,
}

/// Answer from the assistant query service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub ok: bool,
    pub answer: String,
    pub lang: Language,
    #[serde(default)]
    pub contexts: Vec<AssistantContext>,
}

/// One retrieval context backing an assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantContext {
    pub id: String,
    pub text: String,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in Status::ALL {
            let parsed: Status = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("bogus".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&Status::Mfa).unwrap();
        assert_eq!(json, r#""mfa""#);
        let back: Status = serde_json::from_str(r#""captcha""#).unwrap();
        assert_eq!(back, Status::Captcha);
    }

    #[test]
    fn test_live_mode_default_is_auto() {
        assert_eq!(LiveMode::default(), LiveMode::Auto);
        assert_eq!("off".parse::<LiveMode>().unwrap(), LiveMode::Off);
    }

    #[test]
    fn test_result_deserializes_with_missing_optionals() {
        let json = r#"{
            "id": "1",
            "url": "https://a.com/login",
            "login": "user@a.com",
            "status": "valid",
            "created_at": "2024-01-01T00:00:00Z",
            "domain": "a.com"
        }"#;
        let row: ValidationResult = serde_json::from_str(json).unwrap();
        assert_eq!(row.status, Status::Valid);
        assert!(row.password.is_none());
        assert!(row.latency_ms.is_none());
    }

    #[test]
    fn test_admin_status_deserializes() {
        let json = r#"{
            "ok": true,
            "workers_total": 8,
            "workers_alive": 7,
            "paused": false,
            "running": true,
            "target": 8,
            "accept_uploads": true,
            "queue_size": 1234
        }"#;
        let status: AdminStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.workers_alive, 7);
        assert_eq!(status.queue_size, 1234);
    }
}
