//! Broadcast composition: merge per-topic summaries into one continuous
//! narration script through a second language-model pass.

use tracing::info;

use crate::aggregator::{AggregationReport, TopicResult};
use crate::error::BriefingError;
use crate::llm::{LlmProvider, LlmRequest};

const TOPIC_SEPARATOR: &str = "\n\n--- NEW TOPIC ---\n\n";

/// System instruction for the composition pass.
const BROADCAST_SYSTEM_PROMPT: &str = "\
You are a professional virtual news reporter. Generate a natural, TTS-ready \
news report from the topic blocks provided.

Formatting rules:
- ALWAYS start directly with the content, NO INTRODUCTIONS
- Keep audio length 60-120 seconds per topic
- Use natural speech transitions like \"Meanwhile...\"
- Maintain neutral tone
- End with a short \"To wrap up this segment...\" summary";

/// Labeled blocks for every topic with a usable summary, in report order.
/// Failed and empty topics are skipped silently; that is a content-inclusion
/// policy, not an error signal.
pub fn topic_blocks(report: &AggregationReport) -> Vec<String> {
    report
        .iter()
        .filter_map(|(topic, result)| match result {
            TopicResult::Summary(text) if !text.trim().is_empty() => Some(format!(
                "TOPIC: {topic}\n\nOFFICIAL NEWS CONTENT:\n{text}"
            )),
            _ => None,
        })
        .collect()
}

/// Compose the final narration. Invoked even when no topic produced usable
/// content; the model then sees a degenerate prompt and the caller decides
/// what to do with an empty script.
pub async fn compose_broadcast<P: LlmProvider + ?Sized>(
    provider: &P,
    report: &AggregationReport,
) -> Result<String, BriefingError> {
    let blocks = topic_blocks(report);
    info!(blocks = blocks.len(), topics = report.len(), "composing broadcast");

    let prompt = format!(
        "Create broadcast segments for these topics using available sources:\n\n{}",
        blocks.join(TOPIC_SEPARATOR)
    );

    let request = LlmRequest {
        system: Some(BROADCAST_SYSTEM_PROMPT.to_string()),
        prompt,
        max_tokens: None,
        temperature: None,
        timeout_seconds: None,
    };

    let response = provider
        .generate(request)
        .await
        .map_err(|e| BriefingError::Compose {
            cause: e.to_string(),
        })?;

    Ok(response.content)
}
