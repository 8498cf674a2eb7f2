//! Headline fetching against a Serper-style search API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::BriefingError;

/// A single search-result headline with its snippet. Missing fields
/// degrade to empty strings rather than failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct HeadlineItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

/// Source of per-topic headlines. Implemented by the HTTP search client
/// and by test doubles.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch up to `num` headline items for one topic, combined into a
    /// single text block.
    async fn fetch_headlines(&self, topic: &str, num: usize) -> Result<String, BriefingError>;
}

/// HTTP client for a Serper-style search API.
pub struct SearchClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl SearchClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Newscast/0.1.0")
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Option<Vec<HeadlineItem>>,
    #[serde(default)]
    organic: Option<Vec<HeadlineItem>>,
}

/// Render items as `"{title}: {snippet}"`, keep at most `num`, join with a
/// single space.
pub fn combine_headlines(items: &[HeadlineItem], num: usize) -> String {
    items
        .iter()
        .take(num)
        .map(|item| format!("{}: {}", item.title, item.snippet))
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl SearchProvider for SearchClient {
    async fn fetch_headlines(&self, topic: &str, num: usize) -> Result<String, BriefingError> {
        let fetch_err = |cause: String| BriefingError::Fetch {
            topic: topic.to_string(),
            cause,
        };

        debug!(topic, num, "querying search provider");
        let response = self
            .client
            .post(&self.api_url)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&SearchQuery { q: topic, num })
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(fetch_err(format!("search API error {}: {}", status, body)));
        }

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| fetch_err(format!("failed to parse search response: {}", e)))?;

        // Prefer news-typed results; an absent or empty list falls back to
        // organic ones. Both missing means no headlines, not an error.
        let items = match data.news {
            Some(items) if !items.is_empty() => items,
            _ => data.organic.unwrap_or_default(),
        };

        Ok(combine_headlines(&items, num))
    }
}
