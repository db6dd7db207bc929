//! Configuration for a PDF chat session.
//!
//! Every knob lives in [`ChatConfig`], built via [`ChatConfigBuilder`]. The
//! defaults reproduce the fixed request parameters: Groq's OpenAI-compatible
//! endpoint, `llama-3.3-70b-versatile`, temperature 0.1, and the credential
//! taken from `GROQ_API_KEY`.

use crate::backend::ChatBackend;
use crate::error::PdfChatError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Default chat model identifier.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default OpenAI-compatible API base URL (Groq).
pub const DEFAULT_API_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Environment variable read for the bearer credential by default.
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Configuration for uploading a PDF and answering questions about it.
///
/// # Example
/// ```rust
/// use edgequake_pdfchat::ChatConfig;
///
/// let config = ChatConfig::builder()
///     .model("llama-3.1-8b-instant")
///     .temperature(0.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "llama-3.1-8b-instant");
/// ```
#[derive(Clone)]
pub struct ChatConfig {
    /// Chat model identifier sent with every request. Default: `llama-3.3-70b-versatile`.
    pub model: String,

    /// Sampling temperature. Default: 0.1.
    ///
    /// Low temperature keeps answers extractive and repeatable.
    pub temperature: f32,

    /// Upper bound on generated tokens. Default: None (endpoint default).
    pub max_tokens: Option<usize>,

    /// Base URL of the OpenAI-compatible endpoint; `/chat/completions` is appended.
    pub api_base_url: String,

    /// Name of the environment variable holding the bearer credential.
    pub api_key_env: String,

    /// Explicit credential. Takes precedence over `api_key_env`.
    pub api_key: Option<String>,

    /// edgequake-llm provider name (e.g. "openai", "anthropic", "ollama").
    /// When set, the OpenAI-compatible HTTP backend is not used.
    pub provider_name: Option<String>,

    /// Pre-constructed edgequake-llm provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed backend. Takes precedence over everything else.
    pub backend: Option<Arc<dyn ChatBackend>>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Custom instruction block placed after the document text. If None, uses
    /// [`crate::prompts::DEFAULT_INSTRUCTIONS`].
    pub system_prompt: Option<String>,

    /// Download timeout for URL uploads in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Busy-indicator hooks. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            provider_name: None,
            provider: None,
            backend: None,
            password: None,
            system_prompt: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_base_url", &self.api_base_url)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("system_prompt", &self.system_prompt.is_some())
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl ChatConfig {
    /// Create a new builder for `ChatConfig`.
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder {
            config: Self::default(),
        }
    }

    /// Look up the bearer credential: explicit `api_key` first, then the
    /// environment variable named by `api_key_env`.
    ///
    /// An unset or empty variable is a [`PdfChatError::MissingCredential`].
    pub fn resolve_api_key(&self) -> Result<String, PdfChatError> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(PdfChatError::MissingCredential {
                var: self.api_key_env.clone(),
            }),
        }
    }
}

/// Builder for [`ChatConfig`].
pub struct ChatConfigBuilder {
    config: ChatConfig,
}

impl fmt::Debug for ChatConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ChatConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.config.api_key_env = var.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ChatConfig, PdfChatError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(PdfChatError::InvalidConfig("model must not be empty".into()));
        }
        if c.max_tokens == Some(0) {
            return Err(PdfChatError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if !(c.api_base_url.starts_with("http://") || c.api_base_url.starts_with("https://")) {
            return Err(PdfChatError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        if c.api_key_env.is_empty() {
            return Err(PdfChatError::InvalidConfig(
                "API key variable name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_request_parameters() {
        let c = ChatConfig::default();
        assert_eq!(c.model, "llama-3.3-70b-versatile");
        assert_eq!(c.temperature, 0.1);
        assert_eq!(c.max_tokens, None);
        assert_eq!(c.api_key_env, "GROQ_API_KEY");
        assert!(c.api_base_url.contains("groq.com"));
    }

    #[test]
    fn temperature_is_clamped() {
        let c = ChatConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
        let c = ChatConfig::builder().temperature(-1.0).build().unwrap();
        assert_eq!(c.temperature, 0.0);
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = ChatConfig::builder().model("  ").build().unwrap_err();
        assert!(matches!(err, PdfChatError::InvalidConfig(_)));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let err = ChatConfig::builder()
            .api_base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ftp://example.com"));
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let c = ChatConfig::builder()
            .api_key_env("PDFCHAT_TEST_UNSET_VARIABLE_7F3A")
            .api_key("sk-explicit")
            .build()
            .unwrap();
        assert_eq!(c.resolve_api_key().unwrap(), "sk-explicit");
    }

    #[test]
    fn missing_key_is_a_credential_error() {
        let c = ChatConfig::builder()
            .api_key_env("PDFCHAT_TEST_UNSET_VARIABLE_7F3A")
            .build()
            .unwrap();
        match c.resolve_api_key() {
            Err(PdfChatError::MissingCredential { var }) => {
                assert_eq!(var, "PDFCHAT_TEST_UNSET_VARIABLE_7F3A")
            }
            other => panic!("expected MissingCredential, got {other:?}"),
        }
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = ChatConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
