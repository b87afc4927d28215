//! Client for the assistant query service.

use crate::error::{ApiError, ApiResult};
use crate::client::DEFAULT_TIMEOUT;
use nocti_core::{AssistantResponse, Language};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
struct AssistantQuery<'a> {
    query: &'a str,
    lang: Language,
}

/// Client for `POST /api/nocti-ai/query`.
///
/// The assistant service lives behind its own base URL, configured
/// independently of the validation service.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
}

impl AssistantClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ApiError::InvalidBaseUrl("empty base URL".to_string()));
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            client,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the assistant a question in the given language.
    pub async fn query(&self, text: &str, lang: Language) -> ApiResult<AssistantResponse> {
        debug!(%lang, "Querying assistant");

        let response = self
            .client
            .post(format!("{}/api/nocti-ai/query", self.base_url))
            .json(&AssistantQuery { query: text, lang })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
