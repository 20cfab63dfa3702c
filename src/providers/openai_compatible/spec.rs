//! Static description of each OpenAI-compatible vendor.

/// Endpoint and credential layout of an OpenAI-compatible vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompatProviderSpec {
    pub id: &'static str,
    pub default_base_url: &'static str,
    /// Env vars that override the base URL.
    pub base_url_env: &'static [&'static str],
    /// Env vars holding the API key. Empty means no key is needed.
    pub api_key_env: &'static [&'static str],
    /// Chat path appended to the base URL.
    pub chat_path: &'static str,
    /// Transcription path, when the vendor offers one.
    pub transcription_path: Option<&'static str>,
    pub streaming_transcription: bool,
    /// Vendor name of the sampling seed parameter.
    pub seed_field: &'static str,
}

const DEFAULT: CompatProviderSpec = CompatProviderSpec {
    id: "",
    default_base_url: "",
    base_url_env: &[],
    api_key_env: &[],
    chat_path: "/chat/completions",
    transcription_path: None,
    streaming_transcription: false,
    seed_field: "seed",
};

pub const OPENAI: CompatProviderSpec = CompatProviderSpec {
    id: "openai",
    default_base_url: "https://api.openai.com/v1",
    base_url_env: &["OPENAI_BASE_URL"],
    api_key_env: &["OPENAI_API_KEY"],
    transcription_path: Some("/audio/transcriptions"),
    streaming_transcription: true,
    ..DEFAULT
};

pub const GROQ: CompatProviderSpec = CompatProviderSpec {
    id: "groq",
    default_base_url: "https://api.groq.com/openai/v1",
    api_key_env: &["GROQ_API_KEY"],
    transcription_path: Some("/audio/transcriptions"),
    ..DEFAULT
};

pub const MISTRAL: CompatProviderSpec = CompatProviderSpec {
    id: "mistral",
    default_base_url: "https://api.mistral.ai/v1",
    api_key_env: &["MISTRAL_API_KEY"],
    seed_field: "random_seed",
    ..DEFAULT
};

pub const DEEPSEEK: CompatProviderSpec = CompatProviderSpec {
    id: "deepseek",
    default_base_url: "https://api.deepseek.com/v1",
    api_key_env: &["DEEPSEEK_API_KEY"],
    ..DEFAULT
};

pub const XAI: CompatProviderSpec = CompatProviderSpec {
    id: "xai",
    default_base_url: "https://api.x.ai/v1",
    api_key_env: &["XAI_API_KEY"],
    ..DEFAULT
};

pub const HUGGINGFACE: CompatProviderSpec = CompatProviderSpec {
    id: "huggingface",
    default_base_url: "https://router.huggingface.co/v1",
    api_key_env: &["HF_TOKEN"],
    ..DEFAULT
};

pub const OLLAMA: CompatProviderSpec = CompatProviderSpec {
    id: "ollama",
    default_base_url: "http://localhost:11434",
    base_url_env: &["OLLAMA_API_URL"],
    chat_path: "/v1/chat/completions",
    ..DEFAULT
};

/// Every built-in OpenAI-compatible vendor.
pub const ALL: &[CompatProviderSpec] = &[OPENAI, GROQ, MISTRAL, DEEPSEEK, XAI, HUGGINGFACE, OLLAMA];

impl CompatProviderSpec {
    pub fn requires_api_key(&self) -> bool {
        !self.api_key_env.is_empty()
    }

    /// All env vars this vendor may read.
    pub fn env_keys(&self) -> Vec<&'static str> {
        self.api_key_env
            .iter()
            .chain(self.base_url_env.iter())
            .copied()
            .collect()
    }
}
