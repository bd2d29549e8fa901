use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

const ENV_CONFIG_PATH: &str = "CLAIMS_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Overrides the text-generation endpoint from the config file
const ENV_TEXT_GENERATION_URL: &str = "TEXT_GENERATION_URL";

const DEFAULT_TEXT_GENERATION_URL: &str = "http://127.0.0.1:5000/v1/chat/completions";

/// Local inference servers can take a very long time per completion
const DEFAULT_TIMEOUT_SECS: u64 = 6000;

const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Retry settings for the claim categorizer
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before each retry, in milliseconds
    #[serde(default)]
    pub backoff_ms: u64,
    /// Upper bound of a random delay added to the backoff, in milliseconds
    #[serde(default)]
    pub jitter_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_ms: 0,
            jitter_ms: 0,
        }
    }
}

/// External text-generation service settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextGenerationConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub mode: String,
    pub instruction_template: String,
    pub retry: RetryConfig,
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TEXT_GENERATION_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
            mode: "instruct".to_string(),
            instruction_template: "Alpaca".to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl TextGenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Which document store backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local store, contents are lost on restart
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Claim note file storage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    pub root_dir: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            root_dir: "claim_notes".to_string(),
        }
    }
}

/// Bearer token verification
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// User-info endpoint that accepts the bearer token. Unset disables verification.
    pub userinfo_url: Option<String>,
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub text_generation: TextGenerationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub text_generation: TextGenerationConfig,
    pub storage: StorageConfig,
    pub blob: BlobConfig,
    pub auth: AuthConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text_generation: TextGenerationConfig::default(),
            storage: StorageConfig::default(),
            blob: BlobConfig::default(),
            auth: AuthConfig::default(),
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        let mut text_generation = file.text_generation;
        if let Ok(url) = std::env::var(ENV_TEXT_GENERATION_URL) {
            text_generation.url = url;
        }

        Self {
            text_generation,
            storage: file.storage,
            blob: file.blob,
            auth: file.auth,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents).or_else(|| {
                tracing::warn!(path = %path.display(), "Failed to parse config file, using defaults");
                None
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config(contents: &str) -> Option<ConfigFile> {
        let contents = contents.trim();
        if contents.is_empty() {
            return Some(ConfigFile::default());
        }

        match serde_yaml::from_str(contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::debug!(error = %e, "Config file is not valid YAML");
                None
            }
        }
    }

    /// Check that configured URLs parse before any service is built
    pub fn validate(&self) -> Result<(), String> {
        Url::parse(&self.text_generation.url)
            .map_err(|e| format!("text_generation.url: {}", e))?;
        if let Some(ref userinfo) = self.auth.userinfo_url {
            Url::parse(userinfo).map_err(|e| format!("auth.userinfo_url: {}", e))?;
        }
        if self.text_generation.retry.max_attempts == 0 {
            return Err("text_generation.retry.max_attempts must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
