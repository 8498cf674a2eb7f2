use thiserror::Error;

/// Typed failures for the briefing pipeline.
///
/// Fetch and summarize failures carry the responsible topic and are
/// recovered inside the aggregator as report data; compose and synthesis
/// failures abort the whole request, since there is no meaningful partial
/// broadcast or partial audio.
#[derive(Debug, Error)]
pub enum BriefingError {
    #[error("search failed for topic '{topic}': {cause}")]
    Fetch { topic: String, cause: String },

    #[error("summarization failed for topic '{topic}': {cause}")]
    Summarize { topic: String, cause: String },

    #[error("broadcast composition failed: {cause}")]
    Compose { cause: String },

    #[error("speech synthesis failed: {cause}")]
    Synthesis { cause: String },

    #[error("composed script is empty, nothing to synthesize")]
    EmptyScript,
}
