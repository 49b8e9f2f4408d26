//! Configuration module for anonfs.

use serde::Deserialize;
use std::path::Path;

use crate::{AnonfsError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty = allow any).
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Map domain failures onto HTTP status codes instead of always answering 200.
    #[serde(default)]
    pub strict_http_status: bool,
    /// Maximum request body size in MB (multipart uploads).
    #[serde(default = "default_max_body_mb")]
    pub max_body_mb: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_mb() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            strict_http_status: false,
            max_body_mb: default_max_body_mb(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Number of idle connections kept open.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Maximum lifetime of a pooled connection in seconds.
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    /// How long a connection waits on a locked database, in seconds.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_db_path() -> String {
    "data/anonfs.db".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    5
}

fn default_max_lifetime() -> u64 {
    3600
}

fn default_busy_timeout() -> u64 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            max_lifetime_secs: default_max_lifetime(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

/// Remote upload provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Upload endpoint URL.
    #[serde(default = "default_upload_url")]
    pub url: String,
    /// Optional API token sent with every upload.
    #[serde(default)]
    pub token: Option<String>,
    /// Total request timeout in seconds.
    #[serde(default = "default_upload_timeout")]
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    #[serde(default = "default_upload_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Attempts per file when the provider is unreachable (1 = no retry).
    #[serde(default = "default_upload_max_attempts")]
    pub max_attempts: u32,
}

fn default_upload_url() -> String {
    "https://api.anonfiles.com/upload".to_string()
}

fn default_upload_timeout() -> u64 {
    60
}

fn default_upload_connect_timeout() -> u64 {
    10
}

fn default_upload_max_attempts() -> u32 {
    1
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            url: default_upload_url(),
            token: None,
            timeout_secs: default_upload_timeout(),
            connect_timeout_secs: default_upload_connect_timeout(),
            max_attempts: default_upload_max_attempts(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/anonfs.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Remote upload configuration.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AnonfsError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AnonfsError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `ANONFS_UPLOAD_URL`: upload endpoint
    /// - `ANONFS_UPLOAD_TOKEN`: provider API token
    /// - `ANONFS_DATABASE_PATH`: SQLite file path
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = non_empty_env("ANONFS_UPLOAD_URL") {
            self.upload.url = url;
        }
        if let Some(token) = non_empty_env("ANONFS_UPLOAD_TOKEN") {
            self.upload.token = Some(token);
        }
        if let Some(path) = non_empty_env("ANONFS_DATABASE_PATH") {
            self.database.path = path;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.upload.url)
            .map_err(|e| AnonfsError::Config(format!("invalid upload url: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(AnonfsError::Config(format!(
                "unsupported upload url scheme: {}",
                endpoint.scheme()
            )));
        }
        if self.upload.max_attempts == 0 {
            return Err(AnonfsError::Config(
                "upload.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(AnonfsError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
