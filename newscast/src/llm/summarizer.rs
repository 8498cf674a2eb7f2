// Topic summarizer: condenses one topic's combined headline text into a
// narration paragraph ready for speech synthesis.

use tracing::info;

use super::{LlmProvider, LlmRequest};
use crate::error::BriefingError;

/// System instruction for the per-topic summarization pass.
const SUMMARY_SYSTEM_PROMPT: &str = "\
You are a personal news editor and scriptwriter for a news podcast. \
Turn raw headlines into a clean, professional news script ready to be read \
aloud by a text-to-speech voice. Write like a news anchor speaking \
naturally: no markdown, no emojis, no preamble, neutral tone.";

/// Summarize the combined headline text for one topic. The model's text is
/// returned verbatim, without post-processing. Model identifier and
/// temperature come from the provider's fixed configuration.
pub async fn summarize_topic<P: LlmProvider + ?Sized>(
    provider: &P,
    topic: &str,
    headlines: &str,
) -> Result<String, BriefingError> {
    let request = LlmRequest {
        system: Some(SUMMARY_SYSTEM_PROMPT.to_string()),
        prompt: headlines.to_string(),
        max_tokens: None,
        temperature: None,
        timeout_seconds: None,
    };

    let response = provider
        .generate(request)
        .await
        .map_err(|e| BriefingError::Summarize {
            topic: topic.to_string(),
            cause: e.to_string(),
        })?;

    info!(topic, tokens = response.usage.total_tokens, "topic summarized");
    Ok(response.content)
}
