//! Multi-topic aggregation: fan out fetch + summarize per topic, isolate
//! failures, and collect a report in input order.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::limiter::RateLimiter;
use crate::llm::{summarizer, LlmProvider};
use crate::retry::RetryPolicy;
use crate::search::SearchProvider;

/// Placeholder recorded when the model produces an empty summary.
pub const EMPTY_SUMMARY_PLACEHOLDER: &str = "No summary generated.";

/// Outcome of one topic: a narrated summary, or the failure that exhausted
/// its retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicResult {
    Summary(String),
    Failure(String),
}

/// Per-topic results in request order. Duplicate topics each keep their own
/// entry, so this is an ordered sequence of pairs rather than a map.
#[derive(Debug, Default)]
pub struct AggregationReport {
    entries: Vec<(String, TopicResult)>,
}

impl AggregationReport {
    pub fn from_entries(entries: Vec<(String, TopicResult)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, TopicResult)] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, TopicResult)> {
        self.entries.iter()
    }

    /// First result recorded for `topic`.
    pub fn get(&self, topic: &str) -> Option<&TopicResult> {
        self.entries
            .iter()
            .find(|(t, _)| t == topic)
            .map(|(_, result)| result)
    }
}

/// Tuning knobs for one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Headline items requested per topic
    pub num_results: usize,
    pub rate_limit_permits: usize,
    pub rate_limit_window: Duration,
    pub retry: RetryPolicy,
    /// Delay after each topic completes, on top of the rate limit
    pub topic_pacing: Duration,
    /// Concurrent topic workers
    pub max_concurrency: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            num_results: 10,
            rate_limit_permits: 5,
            rate_limit_window: Duration::from_secs(1),
            retry: RetryPolicy::default(),
            topic_pacing: Duration::from_secs(1),
            max_concurrency: 4,
        }
    }
}

/// Orchestrates headline fetching and summarization across all requested
/// topics. Per-topic failures become report entries and never abort the
/// run or leak out of `aggregate`.
pub struct NewsAggregator<S: ?Sized, L: ?Sized> {
    search: Arc<S>,
    llm: Arc<L>,
    config: AggregatorConfig,
}

impl<S, L> NewsAggregator<S, L>
where
    S: SearchProvider + ?Sized + 'static,
    L: LlmProvider + ?Sized + 'static,
{
    pub fn new(search: Arc<S>, llm: Arc<L>, config: AggregatorConfig) -> Self {
        Self {
            search,
            llm,
            config,
        }
    }

    /// Produce one report entry per input topic, in input order, regardless
    /// of completion order or how many topics failed.
    pub async fn aggregate(&self, topics: &[String]) -> AggregationReport {
        if topics.is_empty() {
            return AggregationReport::default();
        }

        info!(topics = topics.len(), "aggregating news topics");

        // One limiter per run, shared only by this run's workers.
        let limiter = Arc::new(RateLimiter::new(
            self.config.rate_limit_permits,
            self.config.rate_limit_window,
        ));
        let workers = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));

        let mut handles = Vec::with_capacity(topics.len());
        for (index, topic) in topics.iter().cloned().enumerate() {
            let search = self.search.clone();
            let llm = self.llm.clone();
            let limiter = limiter.clone();
            let workers = workers.clone();
            let retry = self.config.retry;
            let num = self.config.num_results;
            let pacing = self.config.topic_pacing;

            handles.push(tokio::spawn(async move {
                let permit = workers.acquire_owned().await.expect("worker pool closed");

                let outcome = retry
                    .run(|| {
                        let search = search.clone();
                        let llm = llm.clone();
                        let limiter = limiter.clone();
                        let topic = topic.clone();
                        async move {
                            // Every attempt's search call counts against the
                            // shared rate budget.
                            limiter.acquire().await;
                            let headlines = search.fetch_headlines(&topic, num).await?;
                            summarizer::summarize_topic(llm.as_ref(), &topic, &headlines).await
                        }
                    })
                    .await;

                let result = match outcome {
                    Ok(text) if text.trim().is_empty() => {
                        TopicResult::Summary(EMPTY_SUMMARY_PLACEHOLDER.to_string())
                    }
                    Ok(text) => TopicResult::Summary(text),
                    Err(err) => {
                        warn!(topic = %topic, %err, "topic failed after retries");
                        TopicResult::Failure(err.to_string())
                    }
                };

                // Pacing runs while the worker slot is still held, so the
                // next topic through this slot is delayed beyond what the
                // rate limiter alone enforces.
                tokio::time::sleep(pacing).await;
                drop(permit);

                (index, topic, result)
            }));
        }

        let mut slots: Vec<Option<(String, TopicResult)>> =
            topics.iter().map(|_| None).collect();
        for handle in handles {
            match handle.await {
                Ok((index, topic, result)) => slots[index] = Some((topic, result)),
                Err(err) => warn!(%err, "topic worker panicked"),
            }
        }

        // Rebuild in input order; a crashed worker still leaves a failure
        // entry for its topic.
        let entries = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    (
                        topics[index].clone(),
                        TopicResult::Failure("topic worker failed".to_string()),
                    )
                })
            })
            .collect();

        info!("aggregation finished");
        AggregationReport { entries }
    }
}
