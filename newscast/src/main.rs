/*
newscast - single-binary main.rs
This binary starts the Rocket HTTP server, or generates a single briefing
from the command line when --topics is given.
*/

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newscast::aggregator::AggregatorConfig;
use newscast::llm::remote::RemoteLlmProvider;
use newscast::llm::LlmProvider;
use newscast::pipeline::BriefingPipeline;
use newscast::retry::RetryPolicy;
use newscast::search::{SearchClient, SearchProvider};
use newscast::server;
use newscast::tts::{SpeechSynthesizer, TtsClient};

#[derive(Parser, Debug)]
#[command(name = "newscast", about = "Newscast single-binary server + briefing pipeline")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate one briefing for these comma-separated topics and exit
    #[arg(long, value_name = "TOPICS")]
    topics: Option<String>,

    /// Output file for --topics mode (defaults to a timestamped mp3 name)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    // Load configuration with defaults
    let config = Config::load_with_defaults(
        if default_path.exists() {
            Some(&default_path)
        } else {
            None
        },
        override_path.as_deref(),
    )
    .await
    .context("failed to load configuration")?;
    info!(default = ?default_path, config_override = ?override_path, "configuration loaded");

    let pipeline = Arc::new(build_pipeline(&config)?);

    // One-shot CLI mode: generate a briefing and write it to disk.
    if let Some(topics) = args.topics {
        let topics: Vec<String> = topics
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        return run_once(&pipeline, &topics, args.output).await;
    }

    server::launch_rocket(pipeline, &config).await
}

/// Build the full pipeline from configuration: search client, remote LLM
/// provider and speech synthesizer, plus aggregation knobs.
fn build_pipeline(config: &Config) -> Result<BriefingPipeline> {
    // --- Search provider ---
    let search_cfg = config.search.clone().unwrap_or_else(|| common::SearchConfig {
        api_url: None,
        api_key_env: None,
        num_results: None,
        timeout_seconds: None,
    });
    let search_url = search_cfg
        .api_url
        .unwrap_or_else(|| "https://google.serper.dev/search".to_string());
    let search_key_env = search_cfg
        .api_key_env
        .unwrap_or_else(|| "SERPER_API_KEY".to_string());
    let search_key = std::env::var(&search_key_env)
        .with_context(|| format!("search API key env var '{}' not set", search_key_env))?;
    let search: Arc<dyn SearchProvider> = Arc::new(SearchClient::new(
        search_url,
        search_key,
        search_cfg.timeout_seconds.unwrap_or(20),
    )?);

    // --- LLM provider ---
    let llm = create_llm_provider(config)?;

    // --- Speech synthesizer ---
    let tts_cfg = config.tts.clone().unwrap_or_else(|| common::TtsConfig {
        api_url: None,
        api_key_env: None,
        voice_id: None,
        model_id: None,
        output_format: None,
        timeout_seconds: None,
    });
    let tts_key_env = tts_cfg
        .api_key_env
        .unwrap_or_else(|| "ELEVEN_API_KEY".to_string());
    let tts_key = std::env::var(&tts_key_env)
        .with_context(|| format!("TTS API key env var '{}' not set", tts_key_env))?;
    let tts: Arc<dyn SpeechSynthesizer> = Arc::new(TtsClient::new(
        tts_cfg
            .api_url
            .unwrap_or_else(|| "https://api.elevenlabs.io".to_string()),
        tts_key,
        tts_cfg
            .voice_id
            .unwrap_or_else(|| "JBFqnCBsd6RMkjVDRZzb".to_string()),
        tts_cfg
            .model_id
            .unwrap_or_else(|| "eleven_multilingual_v2".to_string()),
        tts_cfg
            .output_format
            .unwrap_or_else(|| "mp3_44100_128".to_string()),
        tts_cfg.timeout_seconds.unwrap_or(60),
    )?);

    // --- Aggregation knobs ---
    let agg = config.aggregator.as_ref();
    let retry = RetryPolicy {
        max_attempts: agg.and_then(|a| a.max_attempts).unwrap_or(3),
        base: Duration::from_secs(agg.and_then(|a| a.backoff_base_seconds).unwrap_or(1)),
        min_wait: Duration::from_secs(agg.and_then(|a| a.backoff_min_seconds).unwrap_or(2)),
        max_wait: Duration::from_secs(agg.and_then(|a| a.backoff_max_seconds).unwrap_or(10)),
    };
    let aggregator_config = AggregatorConfig {
        num_results: search_cfg.num_results.unwrap_or(10),
        rate_limit_permits: agg.and_then(|a| a.rate_limit_permits).unwrap_or(5),
        rate_limit_window: Duration::from_secs(
            agg.and_then(|a| a.rate_limit_window_seconds).unwrap_or(1),
        ),
        retry,
        topic_pacing: Duration::from_secs(agg.and_then(|a| a.topic_pacing_seconds).unwrap_or(1)),
        max_concurrency: agg.and_then(|a| a.max_concurrency).unwrap_or(4),
    };

    Ok(BriefingPipeline::new(search, llm, tts, aggregator_config))
}

/// Create an LLM provider based on configuration.
fn create_llm_provider(config: &Config) -> Result<Arc<dyn LlmProvider>> {
    let llm_config = config
        .llm
        .as_ref()
        .context("missing [llm] configuration section")?;
    let adapter = llm_config.adapter.as_deref().unwrap_or("remote");
    match adapter {
        "remote" => {
            let remote = llm_config
                .remote
                .as_ref()
                .context("llm.adapter = \"remote\" but [llm.remote] is missing")?;
            let api_key_env = remote
                .api_key_env
                .as_deref()
                .context("missing api_key_env in [llm.remote]")?;
            let api_key = std::env::var(api_key_env)
                .with_context(|| format!("LLM API key env var '{}' not set", api_key_env))?;

            let model = remote
                .model
                .clone()
                .unwrap_or_else(|| "gpt-4o-mini".to_string());
            let api_url = remote.api_url.clone().unwrap_or_else(|| {
                "https://api.openai.com/v1/chat/completions".to_string()
            });

            let provider = RemoteLlmProvider::new(api_url, api_key, model.as_str()).with_defaults(
                remote.timeout_seconds.unwrap_or(30),
                remote.max_tokens.unwrap_or(1000),
                remote.temperature.unwrap_or(0.4),
            );
            info!(%model, "LLM provider initialized: remote");
            Ok(Arc::new(provider))
        }
        other => anyhow::bail!("Unknown LLM adapter type: {}", other),
    }
}

/// Generate one briefing and write the audio next to the working directory.
async fn run_once(
    pipeline: &BriefingPipeline,
    topics: &[String],
    output: Option<PathBuf>,
) -> Result<()> {
    if topics.is_empty() {
        anyhow::bail!("--topics given but no non-empty topic names found");
    }

    info!(?topics, "generating one-shot briefing");
    let artifact = pipeline
        .generate_briefing(topics)
        .await
        .context("briefing generation failed")?;

    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!("briefing_{}.mp3", Utc::now().format("%Y%m%d_%H%M%S")))
    });
    tokio::fs::write(&path, &artifact.bytes)
        .await
        .with_context(|| format!("failed to write audio to {}", path.display()))?;

    info!(path = %path.display(), bytes = artifact.bytes.len(), "briefing written");
    Ok(())
}
