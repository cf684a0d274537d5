use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Gemini API key. Falls back to `GEMINI_API_KEY` / `GOOGLE_API_KEY` env vars.
    pub api_key: Option<String>,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub scrape: ScrapeConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub sessions: SessionConfig,
}

// ── Gateway ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 3000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
        }
    }
}

// ── Page fetch / chunking ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Target chunk size in characters (soft bound, default: 1000)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Cap on the `fullContent` fallback returned by the analyze endpoint
    #[serde(default = "default_full_content_limit")]
    pub full_content_limit: usize,
    /// Page fetch timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_full_content_limit() -> usize {
    8000
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; SiteChatBot/1.0; +https://example.com/bot)".into()
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            full_content_limit: default_full_content_limit(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

// ── Retrieval ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// How many top-scoring chunks feed the grounding context (default: 3)
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Hard cap on the grounding context, in characters (default: 2000)
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,
}

fn default_top_k() -> usize {
    crate::retrieval::DEFAULT_TOP_K
}

fn default_context_limit() -> usize {
    crate::retrieval::DEFAULT_CONTEXT_LIMIT
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            context_limit: default_context_limit(),
        }
    }
}

// ── Gemini completion API ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model fallback list, tried in order
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Attempts per model before advancing to the next (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_models() -> Vec<String> {
    [
        "gemini-3-flash-preview",
        "gemini-2.5-pro",
        "gemini-2.5-flash",
        "gemini-2.5-flash-preview-09-2025",
        "gemini-2.5-flash-lite-preview-09-2025",
    ]
    .map(String::from)
    .to_vec()
}

fn default_max_retries() -> u32 {
    3
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            max_retries: default_max_retries(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

// ── Session history ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// SQLite database path. Defaults to `~/.sitechat/sessions.db`.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl Config {
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        let sitechat_dir = home.join(".sitechat");
        let config_path = sitechat_dir.join("config.toml");

        if !sitechat_dir.exists() {
            fs::create_dir_all(&sitechat_dir)?;
        }

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            let mut config: Config =
                toml::from_str(&contents).map_err(|e| ConfigError::Load(e.to_string()))?;
            config.config_path.clone_from(&config_path);
            config.validate()?;
            Ok(config)
        } else {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Validation(format!("unserializable config: {e}")))?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scrape.chunk_size == 0 {
            return Err(ConfigError::Validation(
                "scrape.chunk_size must be > 0".into(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::Validation("retrieval.top_k must be > 0".into()));
        }
        if self.gemini.models.is_empty() {
            return Err(ConfigError::Validation(
                "gemini.models must list at least one model".into(),
            ));
        }
        if self.gemini.max_retries == 0 {
            return Err(ConfigError::Validation(
                "gemini.max_retries must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the Gemini API key.
    ///
    /// Priority: config file, then `GEMINI_API_KEY`, then `GOOGLE_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()))
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()))
    }

    /// Session database path, defaulting next to the config file.
    pub fn session_db_path(&self) -> PathBuf {
        self.sessions.db_path.clone().unwrap_or_else(|| {
            self.config_path
                .parent()
                .map_or_else(|| PathBuf::from("sessions.db"), |d| d.join("sessions.db"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pipeline_values() {
        let config = Config::default();
        assert_eq!(config.scrape.chunk_size, 1000);
        assert_eq!(config.scrape.full_content_limit, 8000);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.context_limit, 2000);
        assert_eq!(config.gemini.max_retries, 3);
        assert!((config.gemini.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.gemini.max_output_tokens, 1024);
        assert_eq!(config.gemini.models.len(), 5);
        assert_eq!(config.gemini.models[0], "gemini-3-flash-preview");
    }

    #[test]
    fn empty_config_file_parses_with_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.gateway.host, "127.0.0.1");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str("[scrape]\nchunk_size = 500\n").unwrap();
        assert_eq!(config.scrape.chunk_size, 500);
        assert_eq!(config.scrape.full_content_limit, 8000);
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let zero_chunks = Config {
            scrape: ScrapeConfig {
                chunk_size: 0,
                ..ScrapeConfig::default()
            },
            ..Config::default()
        };
        let err = zero_chunks.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("chunk_size"));

        let no_models = Config {
            gemini: GeminiConfig {
                models: Vec::new(),
                ..GeminiConfig::default()
            },
            ..Config::default()
        };
        let err = no_models.validate().unwrap_err();
        assert!(err.to_string().contains("gemini.models"));
    }

    #[test]
    fn retrieval_defaults_mirror_module_constants() {
        let config = Config::default();
        assert_eq!(config.retrieval.top_k, crate::retrieval::DEFAULT_TOP_K);
        assert_eq!(
            config.retrieval.context_limit,
            crate::retrieval::DEFAULT_CONTEXT_LIMIT
        );
    }

    #[test]
    fn session_db_path_defaults_beside_config() {
        let config = Config {
            config_path: PathBuf::from("/tmp/sitechat/config.toml"),
            ..Config::default()
        };
        assert_eq!(
            config.session_db_path(),
            PathBuf::from("/tmp/sitechat/sessions.db")
        );
    }
}
