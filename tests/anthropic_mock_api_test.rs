#![cfg(feature = "anthropic")]
//! Mock API tests for the Anthropic provider
//!
//! Response formats follow https://docs.anthropic.com/en/api/messages

mod support;

use llmsuite::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn messages_response() -> serde_json::Value {
    json!({
        "id": "msg_01XFDUDYJgAACzvnptvVoYEL",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": "Hello! How can I help you today?"}],
        "model": "claude-3-5-sonnet-20241022",
        "stop_reason": "end_turn",
        "stop_sequence": null,
        "usage": {"input_tokens": 10, "output_tokens": 15}
    })
}

#[tokio::test]
async fn messages_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-5-sonnet-latest",
            "system": "You are terse.",
            "max_tokens": 4096,
            "top_k": 10,
            "messages": [{"role": "user", "content": [{"type": "text", "text": "Hello"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client_for("anthropic", &server);
    let resp = client
        .chat()
        .completions()
        .create(
            ChatCompletionRequest::new(
                "anthropic:claude-3-5-sonnet-latest",
                vec![ChatMessage::system("You are terse."), ChatMessage::user("Hello")],
            )
            .top_k(10),
        )
        .await
        .unwrap();

    assert_eq!(resp.content_text(), Some("Hello! How can I help you today?"));
    assert_eq!(resp.finish_reason(), Some(&FinishReason::Stop));
    let usage = resp.usage.unwrap();
    assert_eq!((usage.prompt_tokens, usage.completion_tokens), (10, 15));
}

#[tokio::test]
async fn api_version_can_be_overridden() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("anthropic-version", "2024-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client_with(
        "anthropic",
        ProviderConfig::new()
            .with_api_key("test-key")
            .with_base_url(server.uri())
            .with_extra("anthropic_version", json!("2024-01-01")),
    );
    client
        .chat()
        .completions()
        .create(ChatCompletionRequest::new(
            "anthropic:claude-3-5-sonnet-latest",
            vec![ChatMessage::user("Hello")],
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn error_envelope_message_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .mount(&server)
        .await;

    let client = support::client_for("anthropic", &server);
    let err = client
        .chat()
        .completions()
        .create(ChatCompletionRequest::new(
            "anthropic:claude-3-5-sonnet-latest",
            vec![ChatMessage::user("Hello")],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LlmError::ProviderError { status: Some(401), ref message, .. } if message == "invalid x-api-key"
    ));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn tool_results_are_sent_as_tool_result_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "user"},
                {"role": "assistant", "content": [{"type": "tool_use", "id": "toolu_1", "name": "get_weather"}]},
                {"role": "user", "content": [{"type": "tool_result", "tool_use_id": "toolu_1"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_2",
            "content": [{"type": "text", "text": "Sunny in Tokyo."}],
            "model": "claude-3-5-sonnet-20241022",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 30, "output_tokens": 5}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({
            "tools": [{"name": "get_weather", "input_schema": {"type": "object"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "content": [{
                "type": "tool_use",
                "id": "toolu_1",
                "name": "get_weather",
                "input": {"location": "Tokyo"}
            }],
            "model": "claude-3-5-sonnet-20241022",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 20, "output_tokens": 10}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let weather = FunctionTool::builder("get_weather")
        .description("Current weather")
        .param(ToolParam::new("location", ParamType::String))
        .handler(|_args| async move { Ok(json!("sunny")) })
        .build()
        .unwrap();

    let client = support::client_for("anthropic", &server);
    let resp = client
        .chat()
        .completions()
        .create(
            ChatCompletionRequest::new(
                "anthropic:claude-3-5-sonnet-latest",
                vec![ChatMessage::user("Weather in Tokyo?")],
            )
            .with_callables(Tools::new().with(weather).unwrap())
            .max_turns(2),
        )
        .await
        .unwrap();
    assert_eq!(resp.content_text(), Some("Sunny in Tokyo."));
}
