//! Logging helpers: subscriber setup and secret masking.
//!
//! The library itself only emits `tracing` events and spans; installing a
//! subscriber is left to the application, optionally via [`init_subscriber`]
//! or [`init_from_env`].

mod subscriber;

pub use subscriber::*;

use reqwest::header::HeaderMap;

/// Mask a credential for log output, keeping a short prefix and suffix.
pub fn mask_sensitive_value(value: &str) -> String {
    fn ends(s: &str, head: usize, tail: usize) -> String {
        let chars: Vec<char> = s.chars().collect();
        let prefix: String = chars[..head].iter().collect();
        let suffix: String = chars[chars.len() - tail..].iter().collect();
        format!("{prefix}...{suffix}")
    }

    if let Some(token) = value.strip_prefix("Bearer ")
        && token.chars().count() > 8
    {
        return format!("Bearer {}", ends(token, 4, 4));
    }
    let len = value.chars().count();
    if (value.starts_with("sk-") || value.starts_with("gsk_")) && len > 12 {
        return ends(value, 8, 4);
    }
    if len > 16 {
        ends(value, 6, 4)
    } else {
        "***".to_string()
    }
}

/// Render headers for debug logs with credential headers masked.
pub fn format_headers_for_logging(headers: &HeaderMap) -> String {
    let mut pairs: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| {
            let name = k.as_str().to_ascii_lowercase();
            let value = v.to_str().unwrap_or("<invalid>");
            let value = if name.contains("authorization")
                || name.contains("key")
                || name.contains("token")
            {
                mask_sensitive_value(value)
            } else {
                value.to_string()
            };
            (name, value)
        })
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn masks_bearer_tokens() {
        assert_eq!(
            mask_sensitive_value("Bearer abcdefghijklmnop"),
            "Bearer abcd...mnop"
        );
    }

    #[test]
    fn masks_openai_style_keys() {
        assert_eq!(
            mask_sensitive_value("sk-proj-1234567890abcd"),
            "sk-proj-...abcd"
        );
    }

    #[test]
    fn short_values_are_fully_hidden() {
        assert_eq!(mask_sensitive_value("secret"), "***");
    }

    #[test]
    fn header_formatting_masks_credentials_only() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("abcdefghijklmnopqrstuvwxyz"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        let out = format_headers_for_logging(&headers);
        assert!(out.contains("content-type: application/json"));
        assert!(out.contains("x-api-key: abcdef...wxyz"));
    }
}
