use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

use crate::llm::{OllamaProvider, OpenAICompatibleProvider, ProviderEntry};

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Persona roster. Empty means the built-in default roster.
    #[serde(default)]
    pub personas: Vec<ProviderEntry>,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    300
}

// ============================================================================
// ProvidersConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProvidersConfig {
    /// Upper bound on a single outbound provider call.
    #[serde(default = "default_provider_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub local: LocalProviderConfig,
    #[serde(default)]
    pub cloud: CloudProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_provider_timeout(),
            local: LocalProviderConfig::default(),
            cloud: CloudProviderConfig::default(),
        }
    }
}

fn default_provider_timeout() -> u64 {
    60
}

#[derive(Debug, Deserialize)]
pub struct LocalProviderConfig {
    #[serde(default = "default_local_base_url")]
    pub base_url: String,
    /// Environment variable holding the optional API key.
    #[serde(default = "default_local_key_env")]
    pub api_key_env: String,
}

impl Default for LocalProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_local_base_url(),
            api_key_env: default_local_key_env(),
        }
    }
}

fn default_local_base_url() -> String {
    OllamaProvider::DEFAULT_BASE_URL.to_string()
}

fn default_local_key_env() -> String {
    "OLLAMA_API_KEY".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CloudProviderConfig {
    #[serde(default = "default_cloud_base_url")]
    pub base_url: String,
    /// Environment variable holding the required API key.
    #[serde(default = "default_cloud_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for CloudProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_cloud_base_url(),
            api_key_env: default_cloud_key_env(),
            temperature: None,
            max_tokens: None,
        }
    }
}

fn default_cloud_base_url() -> String {
    OpenAICompatibleProvider::DEFAULT_BASE_URL.to_string()
}

fn default_cloud_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

// ============================================================================
// StoreConfig
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".quizchat/data")
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================
