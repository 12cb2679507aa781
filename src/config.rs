use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

/// Location of the dataset and how to reach the storage endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_key")]
    pub key: String,
    /// Override for S3-compatible endpoints (MinIO, LocalStack)
    pub endpoint: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            region: default_region(),
            bucket: default_bucket(),
            key: default_key(),
            endpoint: None,
            force_path_style: false,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_region() -> String { "ap-northeast-1".to_string() }
fn default_bucket() -> String { "kuso2018".to_string() }
fn default_key() -> String { "av.csv".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with KUSO__)
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    // Seeds the required tables so a source without [server] or [storage]
    // still deserializes with the serde defaults.
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.port", i64::from(default_port()))?
            .set_default("storage.bucket", default_bucket())
    }
}

/// e.g., KUSO__STORAGE__BUCKET -> storage.bucket
fn environment() -> Environment {
    Environment::with_prefix("KUSO")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
