/*!
common/src/lib.rs

Shared configuration types for Newscast.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file
- Default/override merging so a packaged config.default.toml can be
  overridden by a local config.toml
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// HTTP server configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server (e.g. "0.0.0.0")
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Search provider configuration (headline fetching)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub api_url: Option<String>,
    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Maximum headline items requested per topic
    pub num_results: Option<usize>,
    pub timeout_seconds: Option<u64>,
}

/// Remote LLM config (used if `llm.adapter = "remote"`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

/// LLM top-level config grouping adapter selection and remote specifics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub adapter: Option<String>, // "remote", "none"
    pub remote: Option<RemoteLlmConfig>,
}

/// Speech-synthesis provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub output_format: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Aggregation pacing and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorSettings {
    /// Permits granted per rolling rate-limit window
    pub rate_limit_permits: Option<usize>,
    pub rate_limit_window_seconds: Option<u64>,
    /// Total attempts per topic (first try included)
    pub max_attempts: Option<u32>,
    pub backoff_base_seconds: Option<u64>,
    pub backoff_min_seconds: Option<u64>,
    pub backoff_max_seconds: Option<u64>,
    /// Delay after each topic completes, on top of the rate limit
    pub topic_pacing_seconds: Option<u64>,
    /// Concurrent topic workers per aggregation run
    pub max_concurrency: Option<usize>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: Option<ServerConfig>,
    pub search: Option<SearchConfig>,
    pub llm: Option<LlmConfig>,
    pub tts: Option<TtsConfig>,
    pub aggregator: Option<AggregatorSettings>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(
        default_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value =
                    toml::from_str(&data).context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value =
                    toml::from_str(&data).context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Convenience: sleep helper used by implementations (kept public for tests)
pub async fn sleep_millis(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
