use newscast::error::BriefingError;
use newscast::tts::{SpeechSynthesizer, TtsClient};

fn client(base_url: String) -> TtsClient {
    TtsClient::new(
        base_url,
        "fake-key",
        "test-voice",
        "eleven_multilingual_v2",
        "mp3_44100_128",
        5,
    )
    .expect("client builds")
}

#[tokio::test]
async fn returns_audio_bytes_with_media_type() {
    let mut server = mockito::Server::new_async().await;

    let audio = vec![0x49u8, 0x44, 0x33, 0x04, 0x00];
    let mock = server
        .mock(
            "POST",
            "/v1/text-to-speech/test-voice?output_format=mp3_44100_128",
        )
        .with_status(200)
        .with_header("content-type", "audio/mpeg")
        .with_body(audio.clone())
        .create_async()
        .await;

    let artifact = client(server.url())
        .synthesize("Good evening, here is the news.")
        .await
        .expect("synthesis succeeds");

    assert_eq!(artifact.bytes, audio);
    assert_eq!(artifact.media_type, "audio/mpeg");
    mock.assert_async().await;
}

#[tokio::test]
async fn provider_error_becomes_typed_synthesis_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock(
            "POST",
            "/v1/text-to-speech/test-voice?output_format=mp3_44100_128",
        )
        .with_status(401)
        .with_body(r#"{"detail": "invalid api key"}"#)
        .create_async()
        .await;

    let err = client(server.url())
        .synthesize("Some narration.")
        .await
        .expect_err("synthesis fails");

    match err {
        BriefingError::Synthesis { cause } => assert!(cause.contains("401")),
        other => panic!("expected Synthesis error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_text_is_rejected_without_calling_the_provider() {
    let mut server = mockito::Server::new_async().await;

    // No request must reach the server for empty input
    let mock = server
        .mock(
            "POST",
            "/v1/text-to-speech/test-voice?output_format=mp3_44100_128",
        )
        .expect(0)
        .create_async()
        .await;

    let err = client(server.url())
        .synthesize("   ")
        .await
        .expect_err("empty input is a precondition violation");

    assert!(matches!(err, BriefingError::Synthesis { .. }));
    mock.assert_async().await;
}
