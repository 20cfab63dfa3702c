//! Shared helpers for mock API tests.
#![allow(dead_code)]

use llmsuite::{Client, EnvSnapshot, ProviderConfig};
use wiremock::MockServer;

/// A client whose `provider` talks to the mock server. The process
/// environment is never consulted.
pub fn client_for(provider: &str, server: &MockServer) -> Client {
    client_with(provider, ProviderConfig::new().with_api_key("test-key").with_base_url(server.uri()))
}

pub fn client_with(provider: &str, config: ProviderConfig) -> Client {
    Client::builder()
        .env_snapshot(EnvSnapshot::empty())
        .provider(provider, config)
        .build()
        .expect("client builds")
}

/// Bytes that sniff as WAV.
pub fn wav_bytes() -> Vec<u8> {
    let mut data = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    data.resize(64, 0);
    data
}

/// Join `(event, data)` pairs into an SSE body.
pub fn sse_body(events: &[(&str, &str)]) -> String {
    events
        .iter()
        .map(|(event, data)| format!("event: {event}\ndata: {data}\n\n"))
        .collect()
}
