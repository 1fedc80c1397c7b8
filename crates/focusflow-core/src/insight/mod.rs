//! Daily productivity insight.
//!
//! Sends today's summary to a generative-text service and returns a short tip.
//! Best effort: [`InsightClient::get_insight`] never fails. Any configuration,
//! network or decoding problem yields [`FALLBACK_INSIGHT`], which tests and
//! callers can tell apart from a real answer.

mod gemini;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::InsightError;
use crate::stats::TodaySummary;
use crate::storage::InsightConfig;

/// Returned whenever the service cannot be reached or is not configured.
pub const FALLBACK_INSIGHT: &str = "Stay focused and take breaks! (AI unavailable)";

/// Returned when the service answers but the answer carries no text.
pub const EMPTY_INSIGHT: &str = "Keep going, you're doing great!";

pub struct InsightClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl InsightClient {
    /// Build a client from config, resolving the key from the environment first.
    pub fn new(config: &InsightConfig) -> Result<Self, InsightError> {
        Self::with_api_key(config, config.resolve_api_key())
    }

    /// Build a client with an explicit key, ignoring the environment.
    pub fn with_api_key(config: &InsightConfig, api_key: Option<String>) -> Result<Self, InsightError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("focusflow/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// A short tip for today's effort. Never fails.
    pub async fn get_insight(&self, summary: TodaySummary) -> String {
        match self.try_get_insight(summary).await {
            Ok(text) => text,
            Err(InsightError::NotConfigured) => {
                debug!("insight API key not configured");
                FALLBACK_INSIGHT.to_string()
            }
            Err(e) => {
                warn!(error = %e, "insight request failed");
                FALLBACK_INSIGHT.to_string()
            }
        }
    }

    async fn try_get_insight(&self, summary: TodaySummary) -> Result<String, InsightError> {
        let api_key = self.api_key.as_deref().ok_or(InsightError::NotConfigured)?;
        let url = gemini::generate_url(&self.endpoint, &self.model)?;
        let body = gemini::GenerateRequest::from_prompt(gemini::build_prompt(summary));

        debug!(%url, count = summary.count, minutes = summary.total_minutes, "requesting insight");
        let resp = self
            .client
            .post(url)
            .header(gemini::API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InsightError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: gemini::GenerateResponse = resp.json().await?;
        Ok(parsed.text().unwrap_or_else(|| EMPTY_INSIGHT.to_string()))
    }
}

/// One-shot helper: build a client from config and fetch an insight.
/// A client that cannot be built also yields the fallback.
pub async fn get_insight(config: &InsightConfig, summary: TodaySummary) -> String {
    match InsightClient::new(config) {
        Ok(client) => client.get_insight(summary).await,
        Err(e) => {
            warn!(error = %e, "could not build insight client");
            FALLBACK_INSIGHT.to_string()
        }
    }
}
