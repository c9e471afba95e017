//! Tag suggestions from a generative model behind an HTTP endpoint.
//!
//! Suggestions are candidates only: nothing here touches the task store.

use super::errors::SuggestError;
use super::helpers::normalize_tags;
use crate::core::settings::SuggestionSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestTagsRequest {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestTagsResponse {
    pub tags: Vec<String>,
}

/// Something that proposes tags for a piece of task text.
#[async_trait]
pub trait TagSuggester: Send + Sync {
    async fn suggest(&self, text: &str) -> Result<Vec<String>, SuggestError>;
}

/// Text sent for suggestions: the description when it has content,
/// otherwise the title.
pub fn suggestion_input(title: &str, description: Option<&str>) -> Result<String, SuggestError> {
    let description = description.map(str::trim).unwrap_or_default();
    if !description.is_empty() {
        return Ok(description.to_string());
    }

    let title = title.trim();
    if !title.is_empty() {
        return Ok(title.to_string());
    }

    Err(SuggestError::EmptyInput)
}

/// Drops suggestions the task already carries (exact match).
pub fn without_existing(suggestions: Vec<String>, existing: &[String]) -> Vec<String> {
    suggestions
        .into_iter()
        .filter(|tag| !existing.contains(tag))
        .collect()
}

/// Posts `{"description": ..}` and expects `{"tags": [..]}` back.
#[derive(Debug, Clone)]
pub struct HttpTagSuggester {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTagSuggester {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SuggestError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SuggestError::unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// `None` when no endpoint is configured.
    pub fn from_settings(settings: &SuggestionSettings) -> Result<Option<Self>, SuggestError> {
        match settings.endpoint.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(endpoint) => Self::new(endpoint, settings.timeout()).map(Some),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TagSuggester for HttpTagSuggester {
    async fn suggest(&self, text: &str) -> Result<Vec<String>, SuggestError> {
        if text.trim().is_empty() {
            return Err(SuggestError::EmptyInput);
        }

        let request = SuggestTagsRequest {
            description: text.to_string(),
        };

        tracing::debug!(target: "suggest", endpoint = %self.endpoint, "Requesting tag suggestions");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(target: "suggest", "Suggestion request failed: {}", e);
                SuggestError::unavailable(format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                target: "suggest",
                status = %status,
                "Suggestion service returned an error: {}",
                body.trim()
            );
            return Err(SuggestError::unavailable(format!(
                "service returned status {}",
                status
            )));
        }

        let parsed = response.json::<SuggestTagsResponse>().await.map_err(|e| {
            tracing::warn!(target: "suggest", "Unusable suggestion response: {}", e);
            SuggestError::unavailable(format!("unusable response: {}", e))
        })?;

        let tags = normalize_tags(&parsed.tags);
        tracing::info!(target: "suggest", count = tags.len(), "Tag suggestions received");
        Ok(tags)
    }
}
