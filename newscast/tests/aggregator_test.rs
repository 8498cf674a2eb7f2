use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use newscast::aggregator::{
    AggregatorConfig, NewsAggregator, TopicResult, EMPTY_SUMMARY_PLACEHOLDER,
};
use newscast::error::BriefingError;
use newscast::llm::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
use newscast::search::SearchProvider;

/// Search double: topics whose name starts with "down" always fail; others
/// return canned headlines. Calls are counted per topic.
struct ScriptedSearch {
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedSearch {
    fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn calls_for(&self, topic: &str) -> usize {
        *self.calls.lock().unwrap().get(topic).unwrap_or(&0)
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    async fn fetch_headlines(&self, topic: &str, _num: usize) -> Result<String, BriefingError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(topic.to_string())
            .or_insert(0) += 1;

        if topic.starts_with("down") {
            Err(BriefingError::Fetch {
                topic: topic.to_string(),
                cause: "connection refused".to_string(),
            })
        } else {
            Ok(format!("{topic} headline: something happened"))
        }
    }
}

/// LLM double: echoes the prompt; prompts starting with "blank" produce an
/// empty completion.
struct EchoLlm;

#[async_trait]
impl LlmProvider for EchoLlm {
    async fn generate(&self, request: LlmRequest) -> anyhow::Result<LlmResponse> {
        let content = if request.prompt.starts_with("blank") {
            String::new()
        } else {
            format!("summary: {}", request.prompt)
        };
        Ok(LlmResponse {
            content,
            usage: UsageMetadata::default(),
            model: "echo".to_string(),
        })
    }
}

fn topics(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn one_entry_per_topic_in_input_order() {
    let aggregator = NewsAggregator::new(
        Arc::new(ScriptedSearch::new()),
        Arc::new(EchoLlm),
        AggregatorConfig::default(),
    );

    // Duplicates are processed independently and each keep their entry
    let input = topics(&["alpha", "beta", "alpha"]);
    let report = aggregator.aggregate(&input).await;

    assert_eq!(report.len(), input.len());
    let order: Vec<_> = report.iter().map(|(t, _)| t.clone()).collect();
    assert_eq!(order, input);
    for (_, result) in report.iter() {
        assert!(matches!(result, TopicResult::Summary(_)));
    }
}

#[tokio::test(start_paused = true)]
async fn failed_topic_is_recorded_and_does_not_abort_others() {
    let aggregator = NewsAggregator::new(
        Arc::new(ScriptedSearch::new()),
        Arc::new(EchoLlm),
        AggregatorConfig::default(),
    );

    let input = topics(&["economy", "downstream outage", "sports"]);
    let report = aggregator.aggregate(&input).await;

    assert_eq!(report.len(), 3);
    match report.get("downstream outage").expect("entry exists") {
        TopicResult::Failure(description) => {
            assert!(description.contains("downstream outage"));
            assert!(description.contains("connection refused"));
        }
        other => panic!("expected Failure, got {other:?}"),
    }
    assert!(matches!(
        report.get("economy"),
        Some(TopicResult::Summary(_))
    ));
    assert!(matches!(report.get("sports"), Some(TopicResult::Summary(_))));
}

#[tokio::test(start_paused = true)]
async fn failing_topic_is_attempted_exactly_max_attempts_times() {
    let search = Arc::new(ScriptedSearch::new());
    let aggregator = NewsAggregator::new(
        search.clone(),
        Arc::new(EchoLlm),
        AggregatorConfig::default(),
    );

    let report = aggregator.aggregate(&topics(&["down again", "fine"])).await;

    assert_eq!(report.len(), 2);
    // Default policy allows 3 total attempts; successful topics need one.
    assert_eq!(search.calls_for("down again"), 3);
    assert_eq!(search.calls_for("fine"), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_model_output_becomes_placeholder_summary() {
    let aggregator = NewsAggregator::new(
        Arc::new(ScriptedSearch::new()),
        Arc::new(EchoLlm),
        AggregatorConfig::default(),
    );

    let report = aggregator.aggregate(&topics(&["blank slate"])).await;

    assert_eq!(
        report.get("blank slate"),
        Some(&TopicResult::Summary(EMPTY_SUMMARY_PLACEHOLDER.to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn empty_topic_list_yields_empty_report() {
    let aggregator = NewsAggregator::new(
        Arc::new(ScriptedSearch::new()),
        Arc::new(EchoLlm),
        AggregatorConfig::default(),
    );

    let report = aggregator.aggregate(&[]).await;
    assert!(report.is_empty());
}
