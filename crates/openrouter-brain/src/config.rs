//! Configuration for OpenRouterBrain.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use chat_core::BrainError;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api";

/// Default model.
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp";

/// Configuration for OpenRouterBrain.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// API base URL; requests go to `{api_url}/v1/chat/completions`.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Completion attempts on transient failures (1 = single call).
    pub max_turns: u32,

    /// Maximum tokens for response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Optional `X-Title` header identifying the app to OpenRouter.
    pub app_title: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_turns: 1,
            max_tokens: Some(512),
            temperature: Some(0.8),
            timeout: Duration::from_secs(30),
            app_title: None,
        }
    }
}

impl OpenRouterConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `OPENROUTER_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `OPENROUTER_API_URL` - API URL (default: https://openrouter.ai/api)
    /// - `OPENROUTER_APP_TITLE` - value for the `X-Title` header
    /// - `AI_MODEL` - Model name (default: google/gemini-2.0-flash-exp)
    /// - `AI_MAX_TURNS` - Completion attempts (default: 1)
    /// - `AI_MAX_TOKENS` - Max tokens (default: 512)
    /// - `AI_TEMPERATURE` - Temperature (default: 0.8)
    /// - `AI_TIMEOUT` - Request timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, BrainError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`OpenRouterConfig::from_env`] with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BrainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("OPENROUTER_API_KEY").ok_or_else(|| {
            BrainError::Configuration("OPENROUTER_API_KEY not set".to_string())
        })?;

        let defaults = Self::default();

        let max_turns: u32 = parse(&get, "AI_MAX_TURNS")?.unwrap_or(defaults.max_turns);
        if max_turns == 0 {
            return Err(BrainError::Configuration(
                "AI_MAX_TURNS must be at least 1".to_string(),
            ));
        }

        let temperature: Option<f32> = parse(&get, "AI_TEMPERATURE")?.or(defaults.temperature);
        if temperature.is_some_and(|t| !(0.0..=2.0).contains(&t)) {
            return Err(BrainError::Configuration(
                "AI_TEMPERATURE must be between 0.0 and 2.0".to_string(),
            ));
        }

        let timeout_secs: f64 = parse(&get, "AI_TIMEOUT")?.unwrap_or(30.0);
        if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
            return Err(BrainError::Configuration(
                "AI_TIMEOUT must be a positive number of seconds".to_string(),
            ));
        }
        let timeout = Duration::try_from_secs_f64(timeout_secs)
            .map_err(|e| BrainError::Configuration(format!("AI_TIMEOUT: {}", e)))?;

        Ok(Self {
            api_url: get("OPENROUTER_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            api_key,
            model: get("AI_MODEL").unwrap_or(defaults.model),
            max_turns,
            max_tokens: parse(&get, "AI_MAX_TOKENS")?.or(defaults.max_tokens),
            temperature,
            timeout,
            app_title: get("OPENROUTER_APP_TITLE"),
        })
    }

    /// Create a new config builder.
    pub fn builder() -> OpenRouterConfigBuilder {
        OpenRouterConfigBuilder::default()
    }

    /// Full chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.api_url)
    }
}

fn parse<T, G>(get: &G, key: &str) -> Result<Option<T>, BrainError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            BrainError::Configuration(format!("{} has an invalid value: {:?}", key, raw))
        }),
    }
}

/// Builder for OpenRouterConfig.
#[derive(Debug, Default)]
pub struct OpenRouterConfigBuilder {
    config: OpenRouterConfig,
}

impl OpenRouterConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the number of completion attempts.
    pub fn max_turns(mut self, turns: u32) -> Self {
        self.config.max_turns = turns.max(1);
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the `X-Title` header.
    pub fn app_title(mut self, title: impl Into<String>) -> Self {
        self.config.app_title = Some(title.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OpenRouterConfig {
        self.config
    }
}
