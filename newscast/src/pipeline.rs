//! End-to-end briefing generation: aggregate, compose, synthesize.

use std::sync::Arc;
use tracing::info;

use crate::aggregator::{AggregatorConfig, NewsAggregator};
use crate::broadcast;
use crate::error::BriefingError;
use crate::llm::LlmProvider;
use crate::search::SearchProvider;
use crate::tts::{AudioArtifact, SpeechSynthesizer};

/// Wires the aggregation, composition and synthesis stages together.
/// Providers are capability objects handed in at construction.
pub struct BriefingPipeline {
    search: Arc<dyn SearchProvider>,
    llm: Arc<dyn LlmProvider>,
    tts: Arc<dyn SpeechSynthesizer>,
    aggregator_config: AggregatorConfig,
}

impl BriefingPipeline {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        llm: Arc<dyn LlmProvider>,
        tts: Arc<dyn SpeechSynthesizer>,
        aggregator_config: AggregatorConfig,
    ) -> Self {
        Self {
            search,
            llm,
            tts,
            aggregator_config,
        }
    }

    /// Turn a topic list into one audio briefing.
    ///
    /// Per-topic failures are recovered inside the aggregation stage, and
    /// composition always runs, even over a fully failed or empty report.
    /// A script that comes back empty is reported as `EmptyScript` instead
    /// of being sent to the synthesizer.
    pub async fn generate_briefing(
        &self,
        topics: &[String],
    ) -> Result<AudioArtifact, BriefingError> {
        let aggregator = NewsAggregator::new(
            self.search.clone(),
            self.llm.clone(),
            self.aggregator_config.clone(),
        );
        let report = aggregator.aggregate(topics).await;

        let script = broadcast::compose_broadcast(self.llm.as_ref(), &report).await?;
        if script.trim().is_empty() {
            return Err(BriefingError::EmptyScript);
        }
        info!(chars = script.len(), "broadcast script composed");

        self.tts.synthesize(&script).await
    }
}
