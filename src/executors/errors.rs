//! HTTP error classification shared by executors.

use serde_json::Value;

use crate::error::LlmError;

/// Build a [`LlmError::ProviderError`] from a non-success response.
///
/// Understands the common vendor envelopes:
/// - OpenAI-compatible and Anthropic: `{"error": {"message": ..}}`
/// - Google: `{"error": {"message": .., "status": ..}}`
/// - Deepgram: `{"err_msg": ..}`
/// - `{"error": "..."}` and `{"message": ".."}`
///
/// Anything else is forwarded as the raw body.
pub fn classify_http_error(provider_id: &str, status: u16, body_text: &str) -> LlmError {
    let details: Option<Value> = serde_json::from_str(body_text).ok();
    let message = details
        .as_ref()
        .and_then(extract_error_message)
        .unwrap_or_else(|| {
            if body_text.trim().is_empty() {
                reqwest::StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body_text.to_string()
            }
        });

    LlmError::ProviderError {
        provider: provider_id.to_string(),
        status: Some(status),
        message,
        details,
    }
}

fn extract_error_message(json: &Value) -> Option<String> {
    if let Some(error) = json.get("error") {
        if let Some(s) = error.as_str() {
            return Some(s.to_string());
        }
        if let Some(message) = error.get("message").and_then(Value::as_str) {
            return Some(match error.get("status").and_then(Value::as_str) {
                Some(status) => format!("{message} ({status})"),
                None => message.to_string(),
            });
        }
    }
    json.get("err_msg")
        .or_else(|| json.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Read the body of a failed response and classify it.
pub async fn classify_error_response(provider_id: &str, resp: reqwest::Response) -> LlmError {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let error = classify_http_error(provider_id, status, &text);
    tracing::warn!(provider = %provider_id, status, error = %error, "Provider returned an error");
    error
}

/// Parse a JSON response body.
pub fn parse_json_text(text: &str) -> Result<Value, LlmError> {
    serde_json::from_str(text)
        .map_err(|e| LlmError::ParseError(format!("Failed to parse response JSON: {e}")))
}
