use std::env;

pub const OPENAI_DEFAULT_HOST: &str = "https://api.openai.com";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const ANTHROPIC_DEFAULT_HOST: &str = "https://api.anthropic.com";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
pub const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 4096;
pub const WEB_SEARCH_DEFAULT_HOST: &str = "https://api.search.brave.com";

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
}

impl OpenAiProviderConfig {
    /// Read `OPENAI_API_KEY` and `OPENAI_HOST`. A missing key is left empty so the
    /// failure shows up on the first request instead of at startup.
    pub fn from_env() -> Self {
        Self {
            host: env::var("OPENAI_HOST").unwrap_or_else(|_| OPENAI_DEFAULT_HOST.to_string()),
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: OPENAI_DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

impl AnthropicProviderConfig {
    /// Read `ANTHROPIC_API_KEY` and `ANTHROPIC_HOST`, same policy as the OpenAI config
    pub fn from_env() -> Self {
        Self {
            host: env::var("ANTHROPIC_HOST")
                .unwrap_or_else(|_| ANTHROPIC_DEFAULT_HOST.to_string()),
            api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: ANTHROPIC_DEFAULT_MODEL.to_string(),
            max_tokens: ANTHROPIC_DEFAULT_MAX_TOKENS,
        }
    }
}

/// Credentials for the Brave search API used by the `web_search` tool
#[derive(Debug, Clone)]
pub struct WebSearchConfig {
    pub host: String,
    pub api_key: String,
}

impl WebSearchConfig {
    /// Read `BRAVE_API_KEY` and `BRAVE_SEARCH_HOST`. A missing key only fails
    /// the searches themselves.
    pub fn from_env() -> Self {
        Self {
            host: env::var("BRAVE_SEARCH_HOST")
                .unwrap_or_else(|_| WEB_SEARCH_DEFAULT_HOST.to_string()),
            api_key: env::var("BRAVE_API_KEY").unwrap_or_default(),
        }
    }
}

/// Load `.env` from the working directory if there is one, returning whether it was found
pub fn load_env() -> bool {
    match dotenv::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded environment file");
            true
        }
        Err(err) => {
            tracing::warn!("no .env file loaded: {}", err);
            false
        }
    }
}
