//! Unified client
//!
//! Routes `provider:model` identifiers to provider adapters. Adapters are
//! built lazily on first use, once per provider, and shared afterwards.
//!
//! ```rust,ignore
//! let client = Client::new(ClientConfig::new())?;
//! let resp = client
//!     .chat()
//!     .completions()
//!     .create(ChatCompletionRequest::new(
//!         "openai:gpt-4o",
//!         vec![ChatMessage::user("Hello")],
//!     ))
//!     .await?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::Instrument;

use crate::config::{ClientConfig, EnvSnapshot, ProviderConfig, ResolvedProviderConfig};
use crate::error::LlmError;
use crate::model_id::ModelId;
use crate::orchestrator::{self, OrchestratorOptions, ToolExecutionMode};
use crate::registry::{BuildContext, ProviderFactory, ProviderRegistry};
use crate::retry_api::RetryOptions;
use crate::tools::Tools;
use crate::traits::{LlmClient, ProviderCapabilities};
use crate::types::{
    ChatCompletionResponse, ChatMessage, ChatRequest, CommonParams, HttpConfig, Tool,
    TranscriptionRequest, TranscriptionResult, TranscriptionStream, build_http_client_from_config,
};

/// Multi-provider client. Cheap to clone; clones share the adapter cache.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    registry: ProviderRegistry,
    providers: RwLock<HashMap<String, ProviderConfig>>,
    env: EnvSnapshot,
    http_config: HttpConfig,
    http_client: reqwest::Client,
    retry_options: Option<RetryOptions>,
    adapters: RwLock<HashMap<String, Arc<dyn LlmClient>>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("registry", &self.inner.registry)
            .field("env", &self.inner.env)
            .field("retry_options", &self.inner.retry_options)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client with every compiled-in provider. Provider environment
    /// variables are read once, here.
    pub fn new(config: ClientConfig) -> Result<Self, LlmError> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn chat(&self) -> Chat<'_> {
        Chat { client: self }
    }

    pub fn audio(&self) -> Audio<'_> {
        Audio { client: self }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.inner.registry
    }

    /// Replace a provider's configuration. The cached adapter, if any, is
    /// dropped and rebuilt on next use.
    pub fn configure_provider(
        &self,
        provider: impl AsRef<str>,
        config: ProviderConfig,
    ) -> Result<(), LlmError> {
        let id = self.inner.registry.canonical_id(provider.as_ref())?;
        self.inner
            .providers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), config);
        let dropped = self
            .inner
            .adapters
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id)
            .is_some();
        tracing::debug!(provider = %id, dropped_adapter = dropped, "Provider reconfigured");
        Ok(())
    }

    /// The adapter for a provider id or alias, built on first use.
    pub fn adapter(&self, provider: &str) -> Result<Arc<dyn LlmClient>, LlmError> {
        let (id, factory) = self.inner.registry.resolve(provider)?;
        if let Some(adapter) = self
            .inner
            .adapters
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
        {
            return Ok(adapter.clone());
        }

        let mut adapters = self.inner.adapters.write().unwrap_or_else(|e| e.into_inner());
        // another caller may have built it while we waited for the lock
        if let Some(adapter) = adapters.get(&id) {
            return Ok(adapter.clone());
        }
        let ctx = self.build_context(&id);
        let adapter = factory.create(&ctx)?;
        tracing::debug!(provider = %id, "Built provider adapter");
        adapters.insert(id, adapter.clone());
        Ok(adapter)
    }

    /// What a provider supports. Builds the adapter if needed.
    pub fn capabilities(&self, provider: &str) -> Result<ProviderCapabilities, LlmError> {
        Ok(self.adapter(provider)?.capabilities())
    }

    fn build_context(&self, id: &str) -> BuildContext {
        let explicit = self
            .inner
            .providers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .unwrap_or_default();
        BuildContext {
            config: ResolvedProviderConfig {
                provider_id: id.to_string(),
                explicit,
                env: self.inner.env.clone(),
                http: self.inner.http_config.clone(),
            },
            http_client: self.inner.http_client.clone(),
            retry_options: self.inner.retry_options.clone(),
        }
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    config: ClientConfig,
    registry: ProviderRegistry,
    aliases: Vec<(String, String)>,
    retry_options: Option<RetryOptions>,
    env: Option<EnvSnapshot>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            registry: ProviderRegistry::with_builtin_providers(),
            aliases: Vec::new(),
            retry_options: None,
            env: None,
        }
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(mut self, id: impl AsRef<str>, config: ProviderConfig) -> Self {
        self.config = self.config.provider(id, config);
        self
    }

    pub fn http_config(mut self, http: HttpConfig) -> Self {
        self.config.http = http;
        self
    }

    /// Retry retryable failures (429, 5xx, transport) with exponential
    /// backoff. Off by default.
    pub fn retry(mut self, options: RetryOptions) -> Self {
        self.retry_options = Some(options);
        self
    }

    /// Use this snapshot instead of reading the process environment.
    pub fn env_snapshot(mut self, env: EnvSnapshot) -> Self {
        self.env = Some(env);
        self
    }

    /// Register a custom provider, or replace a built-in one.
    pub fn register_provider(
        mut self,
        id: impl AsRef<str>,
        factory: impl ProviderFactory + 'static,
    ) -> Self {
        self.registry.register(id, Arc::new(factory));
        self
    }

    /// Add a provider alias; checked in [`build`](Self::build).
    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), target.into()));
        self
    }

    pub fn build(self) -> Result<Client, LlmError> {
        let mut registry = self.registry;
        for (alias, target) in &self.aliases {
            registry.add_alias(alias, target)?;
        }

        let env = self
            .env
            .unwrap_or_else(|| EnvSnapshot::capture(registry.env_keys()));
        let http_client = build_http_client_from_config(&self.config.http)?;

        let mut providers = HashMap::new();
        for (key, config) in self.config.providers {
            match registry.canonical_id(&key) {
                Ok(id) => {
                    providers.insert(id, config);
                }
                Err(_) => {
                    tracing::warn!(provider = %key, "Configuration for unregistered provider ignored");
                }
            }
        }

        tracing::debug!(
            providers = ?registry.provider_ids(),
            configured = providers.len(),
            "Client built"
        );
        Ok(Client {
            inner: Arc::new(ClientInner {
                registry,
                providers: RwLock::new(providers),
                env,
                http_config: self.config.http,
                http_client,
                retry_options: self.retry_options,
                adapters: RwLock::new(HashMap::new()),
            }),
        })
    }
}

/// A chat request addressed by `provider:model`.
#[derive(Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub params: CommonParams,
    /// Tool specs sent as-is; the caller handles any tool calls.
    pub tools: Vec<Tool>,
    /// Callables for automatic execution (together with `max_turns`).
    pub callables: Option<Tools>,
    pub max_turns: Option<u32>,
    pub tool_execution: ToolExecutionMode,
    pub extra: serde_json::Map<String, Value>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            params: CommonParams::default(),
            tools: Vec::new(),
            callables: None,
            max_turns: None,
            tool_execution: ToolExecutionMode::default(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.params.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.params.max_tokens = Some(max_tokens);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.params.top_p = Some(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.params.top_k = Some(top_k);
        self
    }

    pub fn stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.stop = Some(stop.into_iter().map(Into::into).collect());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.params.seed = Some(seed);
        self
    }

    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_callables(mut self, callables: Tools) -> Self {
        self.callables = Some(callables);
        self
    }

    /// Enables automatic tool execution when callables are set.
    pub fn max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn tool_execution(mut self, mode: ToolExecutionMode) -> Self {
        self.tool_execution = mode;
        self
    }

    /// Vendor-specific body field, merged without overriding mapped fields.
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

pub struct Chat<'a> {
    client: &'a Client,
}

impl<'a> Chat<'a> {
    pub fn completions(&self) -> Completions<'a> {
        Completions {
            client: self.client,
        }
    }
}

pub struct Completions<'a> {
    client: &'a Client,
}

impl Completions<'_> {
    /// Send a chat request.
    ///
    /// Runs the tool-calling loop when the request carries callables and
    /// `max_turns`; otherwise returns the provider response as-is.
    pub async fn create(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let model_id = ModelId::parse(&request.model)?;
        let adapter = self.client.adapter(model_id.provider())?;
        let chat = adapter.as_chat_capability().ok_or_else(|| {
            LlmError::UnsupportedOperation(format!(
                "Provider '{}' does not support chat",
                adapter.provider_id()
            ))
        })?;

        let ChatCompletionRequest {
            messages,
            params,
            mut tools,
            callables,
            max_turns,
            tool_execution,
            extra,
            ..
        } = request;
        if let Some(callables) = &callables {
            tools.extend(callables.to_specs());
        }
        let mut chat_request = ChatRequest::new(model_id.model(), messages)
            .with_params(params)
            .with_tools(tools);
        chat_request.extra = extra;

        let span = tracing::info_span!(
            "chat_completion",
            provider = %adapter.provider_id(),
            model = %model_id.model(),
        );
        async move {
            match (callables, max_turns) {
                (Some(callables), Some(max_turns)) => {
                    let opts = OrchestratorOptions {
                        max_turns,
                        tool_execution,
                    };
                    orchestrator::generate(chat, chat_request, &callables, opts).await
                }
                _ => chat.chat(chat_request).await,
            }
        }
        .instrument(span)
        .await
    }
}

pub struct Audio<'a> {
    client: &'a Client,
}

impl<'a> Audio<'a> {
    pub fn transcriptions(&self) -> Transcriptions<'a> {
        Transcriptions {
            client: self.client,
        }
    }
}

pub struct Transcriptions<'a> {
    client: &'a Client,
}

impl Transcriptions<'_> {
    fn route(
        &self,
        mut request: TranscriptionRequest,
    ) -> Result<(Arc<dyn LlmClient>, TranscriptionRequest), LlmError> {
        let model_id = ModelId::parse(&request.model)?;
        let adapter = self.client.adapter(model_id.provider())?;
        if adapter.as_transcription_capability().is_none() {
            return Err(LlmError::UnsupportedOperation(format!(
                "Provider '{}' does not support transcription",
                adapter.provider_id()
            )));
        }
        request.model = model_id.model().to_string();
        Ok((adapter, request))
    }

    /// Transcribe a complete audio input.
    pub async fn create(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionResult, LlmError> {
        let (adapter, request) = self.route(request)?;
        match adapter.as_transcription_capability() {
            Some(stt) => stt.transcribe(request).await,
            None => Err(LlmError::UnsupportedOperation(
                "Transcription not supported".to_string(),
            )),
        }
    }

    /// Transcribe incrementally. The stream ends right after the chunk
    /// flagged `is_final`.
    pub async fn create_stream_output(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionStream, LlmError> {
        let (adapter, request) = self.route(request)?;
        if !adapter.capabilities().streaming_transcription {
            return Err(LlmError::UnsupportedOperation(format!(
                "Provider '{}' does not support streaming transcription",
                adapter.provider_id()
            )));
        }
        match adapter.as_transcription_capability() {
            Some(stt) => stt.transcribe_stream(request).await,
            None => Err(LlmError::UnsupportedOperation(
                "Transcription not supported".to_string(),
            )),
        }
    }
}
