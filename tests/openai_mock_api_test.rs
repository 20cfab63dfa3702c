#![cfg(feature = "openai")]
//! Mock API tests for the OpenAI-compatible providers
//!
//! Response bodies follow the Chat Completions reference:
//! https://platform.openai.com/docs/api-reference/chat

mod support;

use llmsuite::prelude::*;
use llmsuite::{EnvSnapshot, RetryOptions};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: serde_json::Value, tool_calls: Option<serde_json::Value>) -> serde_json::Value {
    let finish = if tool_calls.is_some() { "tool_calls" } else { "stop" };
    let mut message = json!({"role": "assistant", "content": content});
    if let Some(calls) = tool_calls {
        message["tool_calls"] = calls;
    }
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "gpt-4o-2024-08-06",
        "choices": [{"index": 0, "message": message, "finish_reason": finish}],
        "usage": {"prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21}
    })
}

fn weather_call() -> serde_json::Value {
    json!([{
        "id": "call_abc",
        "type": "function",
        "function": {"name": "get_weather", "arguments": "{\"location\":\"Tokyo\"}"}
    }])
}

fn weather_tools() -> Tools {
    let tool = FunctionTool::builder("get_weather")
        .description("Current weather for a city")
        .param(ToolParam::new("location", ParamType::String).describe("City name"))
        .handler(|args| async move {
            Ok(json!({
                "location": args["location"],
                "forecast": "sunny",
                "temp_c": 24
            }))
        })
        .build()
        .unwrap();
    Tools::new().with(tool).unwrap()
}

#[tokio::test]
async fn chat_maps_request_and_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "temperature": 0.5,
            "max_tokens": 100,
            "stop": ["END"],
            "seed": 42,
            "user": "u-1",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("Hi there!"), None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client_for("openai", &server);
    let resp = client
        .chat()
        .completions()
        .create(
            ChatCompletionRequest::new(
                "openai:gpt-4o",
                vec![ChatMessage::system("Be brief."), ChatMessage::user("Hello")],
            )
            .temperature(0.5)
            .max_tokens(100)
            .stop(["END"])
            .seed(42)
            .extra("user", json!("u-1")),
        )
        .await
        .unwrap();

    assert_eq!(resp.content_text(), Some("Hi there!"));
    assert_eq!(resp.finish_reason(), Some(&FinishReason::Stop));
    assert_eq!(resp.usage.as_ref().map(|u| u.total_tokens), Some(21));
    assert_eq!(resp.model.as_deref(), Some("gpt-4o-2024-08-06"));
}

#[tokio::test]
async fn vendor_error_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client_for("openai", &server);
    let err = client
        .chat()
        .completions()
        .create(ChatCompletionRequest::new("openai:gpt-4o", vec![ChatMessage::user("Hi")]))
        .await
        .unwrap_err();

    match err {
        LlmError::ProviderError {
            provider,
            status,
            message,
            details,
        } => {
            assert_eq!(provider, "openai");
            assert_eq!(status, Some(401));
            assert_eq!(message, "Incorrect API key provided");
            assert_eq!(details.unwrap()["error"]["code"], "invalid_api_key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = support::client_for("openai", &server);
    let err = client
        .chat()
        .completions()
        .create(ChatCompletionRequest::new("openai:gpt-4o", vec![ChatMessage::user("Hi")]))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(502));
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn retry_recovers_from_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": {"message": "slow down"}})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("ok"), None)))
        .mount(&server)
        .await;

    let client = Client::builder()
        .env_snapshot(EnvSnapshot::empty())
        .provider(
            "openai",
            ProviderConfig::new()
                .with_api_key("test-key")
                .with_base_url(server.uri()),
        )
        .retry(
            RetryOptions::new()
                .with_max_attempts(3)
                .with_initial_interval(std::time::Duration::from_millis(5)),
        )
        .build()
        .unwrap();

    let resp = client
        .chat()
        .completions()
        .create(ChatCompletionRequest::new("openai:gpt-4o", vec![ChatMessage::user("Hi")]))
        .await
        .unwrap();
    assert_eq!(resp.content_text(), Some("ok"));
}

#[tokio::test]
async fn automatic_tool_calling_resolves_weather() {
    let server = MockServer::start().await;
    // second turn: the request carries the tool result
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"tool_call_id\":\"call_abc\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            json!("It is sunny and 24°C in Tokyo."),
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "tools": [{"type": "function", "function": {"name": "get_weather"}}]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(json!(null), Some(weather_call()))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client_for("openai", &server);
    let resp = client
        .chat()
        .completions()
        .create(
            ChatCompletionRequest::new(
                "openai:gpt-4o",
                vec![ChatMessage::user("What's the weather in Tokyo?")],
            )
            .with_callables(weather_tools())
            .max_turns(3),
        )
        .await
        .unwrap();

    assert_eq!(resp.content_text(), Some("It is sunny and 24°C in Tokyo."));
    assert_eq!(resp.intermediate_responses.len(), 1);

    let trace = resp.intermediate_messages().unwrap();
    let roles: Vec<MessageRole> = trace.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
            MessageRole::Assistant
        ]
    );
    assert_eq!(trace[1].tool_calls()[0].function.name, "get_weather");
    assert_eq!(trace[2].tool_call_id.as_deref(), Some("call_abc"));
    assert!(trace[2].text().contains("sunny"));
}

#[tokio::test]
async fn callables_without_max_turns_are_not_executed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(json!(null), Some(weather_call()))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client_for("openai", &server);
    let resp = client
        .chat()
        .completions()
        .create(
            ChatCompletionRequest::new(
                "openai:gpt-4o",
                vec![ChatMessage::user("What's the weather in Tokyo?")],
            )
            .with_callables(weather_tools()),
        )
        .await
        .unwrap();

    assert!(resp.has_tool_calls());
    assert_eq!(resp.finish_reason(), Some(&FinishReason::ToolCalls));
    assert!(resp.intermediate_messages().is_none());
}

#[tokio::test]
async fn mistral_uses_random_seed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"random_seed": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("ok"), None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client_for("mistral", &server);
    client
        .chat()
        .completions()
        .create(
            ChatCompletionRequest::new("mistral:mistral-small", vec![ChatMessage::user("Hi")])
                .seed(7),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn ollama_posts_to_v1_path_without_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("local"), None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client_with("ollama", ProviderConfig::new().with_base_url(server.uri()));
    let resp = client
        .chat()
        .completions()
        .create(ChatCompletionRequest::new("ollama:llama3.1:8b", vec![ChatMessage::user("Hi")]))
        .await
        .unwrap();
    assert_eq!(resp.content_text(), Some("local"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["model"], "llama3.1:8b");
}
