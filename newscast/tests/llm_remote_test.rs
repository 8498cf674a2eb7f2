use newscast::llm::remote::RemoteLlmProvider;
use newscast::llm::{LlmProvider, LlmRequest};

fn request(system: Option<&str>, prompt: &str) -> LlmRequest {
    LlmRequest {
        system: system.map(|s| s.to_string()),
        prompt: prompt.to_string(),
        max_tokens: Some(100),
        temperature: Some(0.4),
        timeout_seconds: Some(10),
    }
}

#[tokio::test]
async fn test_remote_provider_with_mock() {
    let mut server = mockito::Server::new_async().await;

    // Mock successful OpenAI-style response
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "model": "gpt-4o-mini",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "This is a test response"
                    },
                    "finish_reason": "stop"
                }],
                "usage": {
                    "prompt_tokens": 10,
                    "completion_tokens": 5,
                    "total_tokens": 15
                }
            }"#,
        )
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let result = provider.generate(request(None, "Test prompt")).await;

    assert!(result.is_ok());
    let response = result.unwrap();
    assert_eq!(response.content, "This is a test response");
    assert_eq!(response.usage.prompt_tokens, 10);
    assert_eq!(response.usage.completion_tokens, 5);
    assert_eq!(response.usage.total_tokens, 15);
    assert_eq!(response.model, "gpt-4o-mini");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_sends_system_message() {
    let mut server = mockito::Server::new_async().await;

    // The system instruction must travel as the first chat message
    let mock = server
        .mock("POST", "/")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{
                "messages": [
                    {"role": "system", "content": "You are a news anchor."},
                    {"role": "user", "content": "Summarize this."}
                ]
            }"#
            .to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "model": "gpt-4o-mini",
                "choices": [{"message": {"role": "assistant", "content": "ok"}}],
                "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
            }"#,
        )
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let result = provider
        .generate(request(Some("You are a news anchor."), "Summarize this."))
        .await;

    assert!(result.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_error_handling() {
    let mut server = mockito::Server::new_async().await;

    // Mock API error
    let mock = server
        .mock("POST", "/")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Rate limit exceeded"}}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let result = provider.generate(request(None, "Test")).await;

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("429"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_timeout() {
    let mut server = mockito::Server::new_async().await;

    // Mock slow response
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_secs(3));
            w.write_all(b"too late")
        })
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let mut req = request(None, "Test");
    req.timeout_seconds = Some(1);
    let result = provider.generate(req).await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("timed out"));
}
