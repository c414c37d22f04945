//! Non-streaming endpoints against a wiremock server.

use mistral_client::client::{ClientError, Endpoint, MistralClient};
use mistral_client::model::{ChatMessage, FinishReason};
use mistral_client::options::{SecretString, TransportOptions};
use mistral_client::resources::audio::TranscriptionRequest;
use mistral_client::resources::chat::ChatCompletionRequest;
use mistral_client::resources::conversations::{
    ConversationAppendRequest, ConversationEntry, ConversationRequest,
};
use mistral_client::resources::embeddings::EmbeddingRequest;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> MistralClient {
    let options = TransportOptions::new(SecretString::from("test-key"))
        .with_base_url(format!("{}/", server.uri()))
        .with_header("x-client-name".to_string(), "tests".to_string());
    MistralClient::new(options).unwrap()
}

fn completion_body() -> serde_json::Value {
    json!({
        "id": "cmpl-abc123",
        "object": "chat.completion",
        "model": "mistral-small-latest",
        "created": 1_700_000_000u64,
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Paris.",
                "tool_calls": null,
                "prefix": false
            },
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 2, "total_tokens": 14}
    })
}

#[tokio::test]
async fn chat_complete_sends_headers_and_parses_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(header("x-client-name", "tests"))
        .and(body_partial_json(json!({
            "model": "mistral-small-latest",
            "messages": [{"role": "user", "content": "Capital of France?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body()))
        .expect(1)
        .mount(&server)
        .await;

    let messages = vec![ChatMessage::user("Capital of France?")];
    let request = ChatCompletionRequest::new("mistral-small-latest", messages);
    let response = client(&server).chat().complete(request).await.unwrap();

    assert_eq!(response.id, "cmpl-abc123");
    assert_eq!(response.text().as_deref(), Some("Paris."));
    assert_eq!(response.choices[0].finish_reason, Some(FinishReason::Stop));
    assert_eq!(response.usage.prompt_tokens, 12);
}

#[tokio::test]
async fn chat_complete_omits_stream_flag() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body()))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatCompletionRequest::new("mistral-small-latest", vec![ChatMessage::user("Hi")]);
    client(&server).chat().complete(request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body.get("stream").is_none());
}

#[tokio::test]
async fn chat_complete_clears_stream_flag() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut request =
        ChatCompletionRequest::new("mistral-small-latest", vec![ChatMessage::user("Hi")]);
    request.stream = Some(true);
    let response = client(&server).chat().complete(request).await.unwrap();
    assert_eq!(response.text().as_deref(), Some("Paris."));

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body.get("stream").is_none());
}

#[tokio::test]
async fn validation_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "model"], "msg": "Field required", "type": "missing"}]
        })))
        .mount(&server)
        .await;

    let request = ChatCompletionRequest::new("", vec![ChatMessage::user("Hi")]);
    let err = client(&server).chat().complete(request).await.unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status.as_u16(), 422);
            assert_eq!(message, "body.model: Field required");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn embeddings_create() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({"model": "mistral-embed", "input": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "emb-1",
            "object": "list",
            "model": "mistral-embed",
            "usage": {"prompt_tokens": 2, "total_tokens": 2},
            "data": [
                {"object": "embedding", "embedding": [0.1, 0.2], "index": 0},
                {"object": "embedding", "embedding": [0.3, 0.4], "index": 1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let texts = vec!["a".to_string(), "b".to_string()];
    let request = EmbeddingRequest::from_texts("mistral-embed", texts).unwrap();
    let response = client(&server).embeddings().complete(request).await.unwrap();

    assert_eq!(response.vectors().len(), 2);
    assert_eq!(response.vectors()[1], &[0.3f32, 0.4][..]);
}

#[tokio::test]
async fn conversation_start_and_append() {
    let server = MockServer::start().await;
    let reply = |text: &str| {
        json!({
            "object": "conversation.response",
            "conversation_id": "conv_7",
            "outputs": [{
                "type": "message.output",
                "role": "assistant",
                "content": text,
                "id": "m1"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        })
    };

    Mock::given(method("POST"))
        .and(path("/v1/conversations"))
        .and(body_partial_json(json!({
            "agent_id": "ag_1",
            "inputs": [{"type": "message.input", "role": "user", "content": "Hi"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Hello!")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/conversations/conv_7"))
        .and(body_partial_json(json!({"inputs": "Thanks"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Anytime.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let started = client
        .conversations()
        .complete(ConversationRequest::for_agent("ag_1", vec![ConversationEntry::user("Hi")]))
        .await
        .unwrap();
    assert_eq!(started.text(), "Hello!");

    let appended = client
        .conversations()
        .append(&started.conversation_id, ConversationAppendRequest::new("Thanks"))
        .await
        .unwrap();
    assert_eq!(appended.text(), "Anytime.");
}

#[tokio::test]
async fn transcription_by_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .and(body_string_contains("name=\"file_url\""))
        .and(body_string_contains("https://example.com/talk.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "voxtral-mini-latest",
            "text": "Good morning.",
            "language": "en",
            "segments": [{"text": "Good morning.", "start": 0.0, "end": 1.2}],
            "usage": {"prompt_audio_seconds": 1.2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = TranscriptionRequest::new("voxtral-mini-latest")
        .with_file_url("https://example.com/talk.mp3");
    let response = client(&server).audio().transcribe(request).await.unwrap();

    assert_eq!(response.text, "Good morning.");
    assert_eq!(response.segments.len(), 1);
    assert_eq!(response.usage.prompt_audio_seconds, Some(1.2));
}

#[tokio::test]
async fn transcription_without_source_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .audio()
        .transcribe(TranscriptionRequest::new("voxtral-mini-latest"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Config(_)));
}
