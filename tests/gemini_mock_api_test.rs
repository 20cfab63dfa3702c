#![cfg(feature = "google")]
//! Mock API tests for the Google provider (Gemini API and Vertex AI)

mod support;

use llmsuite::prelude::*;
use llmsuite::EnvSnapshot;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

fn generate_response(parts: serde_json::Value, finish: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": parts},
            "finishReason": finish,
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 7, "totalTokenCount": 12},
        "modelVersion": "gemini-1.5-flash-002"
    })
}

#[tokio::test]
async fn generate_content_request_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "Be brief."}]},
            "contents": [{"role": "user", "parts": [{"text": "Hello"}]}],
            "generationConfig": {"maxOutputTokens": 8192, "topK": 40}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(generate_response(json!([{"text": "Hi!"}]), "STOP")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client_for("google", &server);
    let resp = client
        .chat()
        .completions()
        .create(ChatCompletionRequest::new(
            "google:gemini-1.5-flash",
            vec![ChatMessage::system("Be brief."), ChatMessage::user("Hello")],
        ))
        .await
        .unwrap();

    assert_eq!(resp.content_text(), Some("Hi!"));
    assert_eq!(resp.finish_reason(), Some(&FinishReason::Stop));
    assert_eq!(resp.usage.map(|u| u.total_tokens), Some(12));
}

#[tokio::test]
async fn alias_routes_to_gemini_with_function_calling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user"},
                {"role": "model", "parts": [{"functionCall": {"name": "get_weather"}}]},
                {"role": "user", "parts": [{"functionResponse": {"name": "get_weather"}}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(generate_response(
            json!([{"text": "Sunny."}]),
            "STOP",
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .and(body_partial_json(json!({
            "tools": [{"functionDeclarations": [{"name": "get_weather"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(generate_response(
            json!([{"functionCall": {"name": "get_weather", "args": {"location": "Tokyo"}}}]),
            "STOP",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let weather = FunctionTool::builder("get_weather")
        .description("Current weather")
        .param(ToolParam::new("location", ParamType::String))
        .handler(|_args| async move { Ok(json!({"forecast": "sunny"})) })
        .build()
        .unwrap();

    let client = support::client_for("gemini", &server);
    let resp = client
        .chat()
        .completions()
        .create(
            ChatCompletionRequest::new(
                "google-rest:gemini-1.5-pro",
                vec![ChatMessage::user("Weather in Tokyo?")],
            )
            .with_callables(Tools::new().with(weather).unwrap())
            .max_turns(2),
        )
        .await
        .unwrap();

    assert_eq!(resp.content_text(), Some("Sunny."));
    let first = &resp.intermediate_responses[0];
    assert!(first.tool_calls()[0].id.starts_with("call_"));
    assert_eq!(first.finish_reason(), Some(&FinishReason::ToolCalls));
}

/// Matches when no `functionDeclarations` entry carries keywords Gemini
/// rejects, and `ping` has no `parameters` at all.
struct GeminiCompatibleDeclarations;

fn has_key(value: &serde_json::Value, key: &str) -> bool {
    match value {
        serde_json::Value::Object(map) => {
            map.contains_key(key) || map.values().any(|v| has_key(v, key))
        }
        serde_json::Value::Array(items) => items.iter().any(|v| has_key(v, key)),
        _ => false,
    }
}

impl Match for GeminiCompatibleDeclarations {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<serde_json::Value>(&request.body) else {
            return false;
        };
        let decls = &body["tools"][0]["functionDeclarations"];
        let Some(list) = decls.as_array() else {
            return false;
        };
        let ping_has_no_parameters = list
            .iter()
            .any(|d| d["name"] == "ping" && d.get("parameters").is_none());
        ping_has_no_parameters && !has_key(decls, "additionalProperties")
    }
}

#[tokio::test]
async fn callable_tool_schemas_are_gemini_compatible() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "tools": [{"functionDeclarations": [
                {
                    "name": "get_weather",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "location": {"type": "string"},
                            "unit": {"type": "string", "enum": ["celsius", "fahrenheit"]}
                        },
                        "required": ["location"]
                    }
                },
                {"name": "ping"}
            ]}]
        })))
        .and(GeminiCompatibleDeclarations)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(generate_response(json!([{"text": "No tools needed."}]), "STOP")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let weather = FunctionTool::builder("get_weather")
        .description("Current weather")
        .param(ToolParam::new("location", ParamType::String))
        .param(
            ToolParam::new("unit", ParamType::String)
                .optional()
                .one_of(["celsius", "fahrenheit"]),
        )
        .handler(|_args| async move { Ok(json!({"forecast": "sunny"})) })
        .build()
        .unwrap();
    let ping = FunctionTool::builder("ping")
        .description("Liveness check")
        .handler(|_args| async move { Ok(json!("pong")) })
        .build()
        .unwrap();
    let tools = Tools::new().with(weather).unwrap().with(ping).unwrap();

    let client = support::client_for("google", &server);
    let resp = client
        .chat()
        .completions()
        .create(
            ChatCompletionRequest::new(
                "google:gemini-1.5-flash",
                vec![ChatMessage::user("Hello")],
            )
            .with_callables(tools)
            .max_turns(2),
        )
        .await
        .unwrap();
    assert_eq!(resp.content_text(), Some("No tools needed."));
}

#[tokio::test]
async fn api_key_mode_ignores_ambient_credentials_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "AIza-env"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(generate_response(json!([{"text": "rest mode"}]), "STOP")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut sa = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(
        &mut sa,
        br#"{"type":"service_account","project_id":"sa-proj"}"#,
    )
    .unwrap();
    let readable = sa.path().to_string_lossy().into_owned();

    for credentials in [readable.as_str(), "/nonexistent/adc.json"] {
        let client = Client::builder()
            .env_snapshot(
                EnvSnapshot::empty()
                    .with_var("GOOGLE_API_KEY", "AIza-env")
                    .with_var("GOOGLE_APPLICATION_CREDENTIALS", credentials),
            )
            .provider("google", ProviderConfig::new().with_base_url(server.uri()))
            .build()
            .unwrap();
        let resp = client
            .chat()
            .completions()
            .create(ChatCompletionRequest::new(
                "google:gemini-1.5-flash",
                vec![ChatMessage::user("Hello")],
            ))
            .await
            .unwrap();
        assert_eq!(resp.content_text(), Some("rest mode"), "{credentials}");
    }
}

#[tokio::test]
async fn google_error_includes_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let client = support::client_for("google", &server);
    let err = client
        .chat()
        .completions()
        .create(ChatCompletionRequest::new(
            "google:gemini-1.5-flash",
            vec![ChatMessage::user("Hello")],
        ))
        .await
        .unwrap_err();
    match err {
        LlmError::ProviderError { message, .. } => {
            assert_eq!(message, "API key not valid. (INVALID_ARGUMENT)")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn vertex_mode_uses_project_path_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/v1/projects/my-proj/locations/europe-west1/publishers/google/models/gemini-1.5-pro:generateContent",
        ))
        .and(header("authorization", "Bearer ya29.token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(generate_response(json!([{"text": "from vertex"}]), "STOP")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder()
        .env_snapshot(
            EnvSnapshot::empty()
                .with_var("GOOGLE_PROJECT_ID", "my-proj")
                .with_var("GOOGLE_REGION", "europe-west1")
                .with_var("GOOGLE_OAUTH_ACCESS_TOKEN", "ya29.token"),
        )
        .provider("google", ProviderConfig::new().with_base_url(server.uri()))
        .build()
        .unwrap();

    let resp = client
        .chat()
        .completions()
        .create(ChatCompletionRequest::new(
            "google:gemini-1.5-pro",
            vec![ChatMessage::user("Hello")],
        ))
        .await
        .unwrap();
    assert_eq!(resp.content_text(), Some("from vertex"));
}

#[test]
fn vertex_mode_without_token_is_a_configuration_error() {
    let client = Client::builder()
        .env_snapshot(EnvSnapshot::empty().with_var("GOOGLE_PROJECT_ID", "my-proj"))
        .build()
        .unwrap();
    match client.adapter("google") {
        Err(LlmError::ConfigurationError(msg)) => {
            assert!(msg.contains("GOOGLE_OAUTH_ACCESS_TOKEN"))
        }
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => panic!("expected a configuration error"),
    }
}

#[tokio::test]
async fn transcription_is_unsupported() {
    let client = support::client_with("google", ProviderConfig::new().with_api_key("k"));
    let err = client
        .audio()
        .transcriptions()
        .create(TranscriptionRequest::new(
            "google:gemini-1.5-flash",
            AudioInput::bytes(support::wav_bytes(), "a.wav"),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::UnsupportedOperation(_)));
}
