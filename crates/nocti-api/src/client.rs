//! HTTP client for the validation service REST surface.
//!
//! Public endpoints: bulk result pulls, export, upload.
//! Authenticated endpoints (`X-Admin-Token` header): worker/queue
//! control, domain overrides, statistics.

use crate::error::{ApiError, ApiResult};
use crate::query::{result_params, QueryParams};
use crate::token::AdminToken;
use nocti_core::{
    AdminStatus, DomainOverrides, FilterState, SortState, StatsResponse, Status, UploadResponse,
    ValidationResult,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the admin credential.
const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Worker control actions for `POST /admin/control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Start,
    Stop,
    Pause,
    Continue,
}

impl ControlAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::Continue => "continue",
        }
    }
}

impl std::fmt::Display for ControlAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Export payload formats for `GET /results/export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Envelope for `GET /admin/passwords`.
#[derive(Debug, Deserialize)]
struct PasswordsResponse {
    #[allow(dead_code)]
    ok: bool,
    passwords: HashMap<String, String>,
}

/// Client for the validation service API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<AdminToken>,
}

impl ApiClient {
    /// Create a client for a base URL, without an admin token.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Replace the admin token (None clears it).
    pub fn set_token(&mut self, token: Option<AdminToken>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Attach the admin token header, failing fast when none is set.
    fn authed(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let token = self.token.as_ref().ok_or(ApiError::MissingToken)?;
        Ok(self
            .request(method, path)
            .header(ADMIN_TOKEN_HEADER, token.expose()))
    }

    /// Map non-2xx responses to typed failures.
    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ApiError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Http {
            status: status.as_u16(),
            body,
        })
    }

    /// Bulk pull of validation results with the current filter/sort.
    pub async fn fetch_results(
        &self,
        filters: &FilterState,
        sort: &SortState,
        limit: usize,
    ) -> ApiResult<Vec<ValidationResult>> {
        let params = result_params(filters, sort, limit);
        debug!(limit, "Fetching results");

        let response = self
            .request(Method::GET, "/results")
            .query(params.as_pairs())
            .send()
            .await?;
        let response = Self::check(response).await?;

        let rows: Vec<ValidationResult> = response.json().await?;
        debug!(count = rows.len(), "Fetched results");
        Ok(rows)
    }

    /// Raw export payload (CSV text or JSON text) for the current query.
    pub async fn export_results(
        &self,
        format: ExportFormat,
        filters: &FilterState,
        sort: &SortState,
        limit: usize,
    ) -> ApiResult<String> {
        let mut params = result_params(filters, sort, limit);
        params.push("format", format.as_str());

        let response = self
            .request(Method::GET, "/results/export")
            .query(params.as_pairs())
            .send()
            .await?;
        let response = Self::check(response).await?;

        Ok(response.text().await?)
    }

    /// Upload a credential list.
    ///
    /// Only `.txt` files are accepted; anything else is rejected locally
    /// before any network call.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<UploadResponse> {
        if !file_name.to_ascii_lowercase().ends_with(".txt") {
            return Err(ApiError::InvalidUpload(format!(
                "only .txt files are accepted, got {file_name}"
            )));
        }

        info!(file = %file_name, size = bytes.len(), "Uploading credential list");

        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .request(Method::POST, "/upload")
            .multipart(form)
            .send()
            .await?;
        let response = Self::check(response).await?;

        Ok(response.json().await?)
    }

    /// Worker/queue status. Authenticated.
    pub async fn admin_status(&self) -> ApiResult<AdminStatus> {
        let response = self.authed(Method::GET, "/admin/status")?.send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Worker control (start/stop/pause/continue). Authenticated.
    pub async fn admin_control(
        &self,
        action: ControlAction,
        workers: Option<u32>,
    ) -> ApiResult<AdminStatus> {
        let mut params = QueryParams::new();
        params.push("action", action.as_str());
        params.push_opt("workers", workers);

        info!(%action, ?workers, "Sending worker control");

        let response = self
            .authed(Method::POST, "/admin/control")?
            .query(params.as_pairs())
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Delete results by status, or all when `status` is None. Authenticated.
    pub async fn admin_cleanup(&self, status: Option<Status>) -> ApiResult<()> {
        let mut params = QueryParams::new();
        params.push_opt("status", status.map(|s| s.to_string()));

        let response = self
            .authed(Method::POST, "/admin/cleanup")?
            .query(params.as_pairs())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Full pipeline reset. Authenticated.
    pub async fn admin_reset(&self) -> ApiResult<()> {
        warn!("Sending pipeline reset");
        let response = self.authed(Method::POST, "/admin/reset")?.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Clear the pending queue. Authenticated.
    pub async fn admin_queue_clear(&self) -> ApiResult<()> {
        let response = self
            .authed(Method::POST, "/admin/queue/clear")?
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Enable/disable drain mode (reject new uploads, keep working the
    /// queue). Authenticated.
    pub async fn admin_queue_drain(&self, enable: bool) -> ApiResult<()> {
        let mut params = QueryParams::new();
        params.push("enable", if enable { "true" } else { "false" });

        let response = self
            .authed(Method::POST, "/admin/queue/drain")?
            .query(params.as_pairs())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Per-domain concurrency overrides. Authenticated.
    pub async fn admin_domains(&self) -> ApiResult<DomainOverrides> {
        let response = self.authed(Method::GET, "/admin/domains")?.send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Set one domain override. Authenticated.
    pub async fn admin_domain_set(&self, domain: &str, limit: u32) -> ApiResult<()> {
        let mut params = QueryParams::new();
        params.push("domain", domain);
        params.push("limit", limit.to_string());

        let response = self
            .authed(Method::POST, "/admin/domain_set")?
            .query(params.as_pairs())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Delete one domain override. Authenticated.
    pub async fn admin_domain_delete(&self, domain: &str) -> ApiResult<()> {
        let mut params = QueryParams::new();
        params.push("domain", domain);

        let response = self
            .authed(Method::POST, "/admin/domain_delete")?
            .query(params.as_pairs())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Set the validator browser-pool concurrency. Authenticated.
    pub async fn admin_set_concurrency(&self, concurrency: u32) -> ApiResult<()> {
        let mut params = QueryParams::new();
        params.push("concurrency", concurrency.to_string());

        let response = self
            .authed(Method::POST, "/admin/pw_set")?
            .query(params.as_pairs())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Reveal plaintext passwords for the given result ids. Authenticated.
    pub async fn admin_passwords(&self, ids: &[String]) -> ApiResult<HashMap<String, String>> {
        let mut params = QueryParams::new();
        params.push_each("id", ids.iter().map(String::as_str));

        let response = self
            .authed(Method::GET, "/admin/passwords")?
            .query(params.as_pairs())
            .send()
            .await?;
        let response = Self::check(response).await?;

        let payload: PasswordsResponse = response.json().await?;
        Ok(payload.passwords)
    }

    /// Aggregate statistics for a trailing window. Authenticated.
    pub async fn fetch_stats(&self, window_minutes: u32, top: u32) -> ApiResult<StatsResponse> {
        let mut params = QueryParams::new();
        params.push("window_minutes", window_minutes.to_string());
        params.push("top", top.to_string());

        let response = self
            .authed(Method::GET, "/admin/stats")?
            .query(params.as_pairs())
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Stats as CSV text. Authenticated.
    pub async fn fetch_stats_csv(&self, window_minutes: u32, top: u32) -> ApiResult<String> {
        let mut params = QueryParams::new();
        params.push("window_minutes", window_minutes.to_string());
        params.push("top", top.to_string());
        params.push("format", "csv");

        let response = self
            .authed(Method::GET, "/admin/stats")?
            .query(params.as_pairs())
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.text().await?)
    }
}

/// Trim trailing slashes so path joins are uniform.
fn normalize_base_url(base_url: String) -> ApiResult<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidBaseUrl("empty base URL".to_string()));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ApiError::InvalidBaseUrl(base_url));
    }
    Ok(trimmed.to_string())
}
