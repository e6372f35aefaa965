//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for survey-server.
///
/// Every field except the provider credentials has a default, so the relay
/// starts without any environment set; calls to an unconfigured provider
/// fail with a 500.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_openapi: bool,

    /// Credentials and endpoint of the streaming chat-completion provider.
    pub openai: ProviderConfig,

    /// Credentials and endpoint of the single-shot text-generation provider.
    pub huggingface: ProviderConfig,
}

/// Connection details for one upstream provider.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Upstream model name.
    pub model: String,
    /// Bearer token. Treated as an opaque secret.
    pub api_key: Option<String>,
}

// Keep the key out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("SURVEY_BIND", "0.0.0.0:3000"),
            log_level: env_or("SURVEY_LOG", "info"),
            log_json: env_flag("SURVEY_LOG_JSON", false),
            cors_allowed_origins: std::env::var("SURVEY_CORS_ORIGINS").ok(),
            enable_openapi: env_flag("SURVEY_ENABLE_OPENAPI", true),
            openai: ProviderConfig {
                base_url: trim_base(env_or("SURVEY_OPENAI_BASE_URL", "https://api.openai.com/v1")),
                model: env_or("SURVEY_OPENAI_MODEL", "gpt-3.5-turbo"),
                api_key: secret("OPENAI_API_KEY"),
            },
            huggingface: ProviderConfig {
                base_url: trim_base(env_or(
                    "SURVEY_HF_BASE_URL",
                    "https://api-inference.huggingface.co",
                )),
                model: env_or("SURVEY_HF_MODEL", "gpt2"),
                api_key: secret("HUGGINGFACE_API_KEY"),
            },
        }
    }
}

#[cfg(test)]
impl Config {
    /// Configuration pointing both providers at a local mock server.
    pub fn for_tests(upstream_base: &str) -> Self {
        let provider = |model: &str| ProviderConfig {
            base_url: trim_base(upstream_base.to_owned()),
            model: model.to_owned(),
            api_key: Some("test-key".to_owned()),
        };
        Self {
            bind_address: "127.0.0.1:0".to_owned(),
            log_level: "debug".to_owned(),
            log_json: false,
            cors_allowed_origins: None,
            enable_openapi: true,
            openai: provider("gpt-3.5-turbo"),
            huggingface: provider("gpt2"),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn secret(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_owned()
}
