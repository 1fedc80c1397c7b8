//! Wire types for the `generateContent` REST call.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::InsightError;
use crate::stats::TodaySummary;

pub(crate) const API_KEY_HEADER: &str = "x-goog-api-key";

/// `{endpoint}/v1beta/models/{model}:generateContent`. Any path already on
/// the endpoint (a proxy prefix) is kept.
pub(crate) fn generate_url(endpoint: &str, model: &str) -> Result<Url, InsightError> {
    let base = Url::parse(&format!("{}/", endpoint.trim_end_matches('/')))?;
    Ok(base.join(&format!("v1beta/models/{model}:generateContent"))?)
}

pub(crate) fn build_prompt(summary: TodaySummary) -> String {
    format!(
        "I am using a Pomodoro timer. Today, I have completed {count} work sessions, \
         totaling {minutes} minutes of focus. Based on this effort, give me a brief, \
         encouraging productivity insight or tip. If the count is low, motivate me to start. \
         If the count is high, remind me to rest or praise my consistency. \
         Keep it under 50 words. Be friendly and concise.",
        count = summary.count,
        minutes = summary.total_minutes,
    )
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    pub(crate) fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, trimmed. `None` if there is none.
    pub(crate) fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
