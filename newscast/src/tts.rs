//! Speech synthesis: render the final narration text to audio bytes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::error::BriefingError;

/// Terminal pipeline output: one contiguous audio byte sequence plus its
/// declared media type.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

/// Speech-synthesis seam, implemented by the HTTP client and test doubles.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioArtifact, BriefingError>;
}

/// HTTP client for an ElevenLabs-style text-to-speech API.
pub struct TtsClient {
    client: Client,
    base_url: String,
    api_key: String,
    voice_id: String,
    model_id: String,
    output_format: String,
}

impl TtsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        voice_id: impl Into<String>,
        model_id: impl Into<String>,
        output_format: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Newscast/0.1.0")
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            voice_id: voice_id.into(),
            model_id: model_id.into(),
            output_format: output_format.into(),
        })
    }

    fn media_type(&self) -> &'static str {
        if self.output_format.starts_with("mp3_") {
            "audio/mpeg"
        } else {
            "application/octet-stream"
        }
    }
}

#[derive(Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[async_trait]
impl SpeechSynthesizer for TtsClient {
    async fn synthesize(&self, text: &str) -> Result<AudioArtifact, BriefingError> {
        let synth_err = |cause: String| BriefingError::Synthesis { cause };

        // Empty input is a caller bug, not a provider condition.
        if text.trim().is_empty() {
            return Err(synth_err("empty input text".to_string()));
        }

        let url = format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.base_url.trim_end_matches('/'),
            self.voice_id,
            self.output_format
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&SynthesisBody {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await
            .map_err(|e| synth_err(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(synth_err(format!("TTS API error {}: {}", status, body)));
        }

        // Buffer the chunked audio body into one contiguous byte sequence.
        let bytes = response
            .bytes()
            .await
            .map_err(|e| synth_err(e.to_string()))?;

        info!(bytes = bytes.len(), "synthesized narration audio");
        Ok(AudioArtifact {
            bytes: bytes.to_vec(),
            media_type: self.media_type(),
        })
    }
}
