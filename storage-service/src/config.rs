// storage-service/src/config.rs

use serde::{Deserialize, Serialize};
use shared::env::{self, EnvError};
use shared::observability::{LogConfig, LogFormat, LogLevel};
use thiserror::Error;

use crate::services::provisioner::is_valid_bucket_name;

/// 100 MiB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Object store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_key: String,
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub default_bucket: String,
    pub secure: bool,
    pub region: String,
    pub operation_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_size: u64,
    /// Lowercase extensions without the dot; empty allows everything.
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            server: ServerConfig {
                host: env::var_or("SERVER_HOST", "0.0.0.0"),
                port: env::parse_var("SERVER_PORT", 5000)?,
            },
            storage: StorageConfig {
                endpoint: env::var_or("MINIO_ENDPOINT", "http://localhost:9000"),
                access_key: env::var_or("MINIO_ROOT_USER", "admin"),
                secret_key: env::var_or("MINIO_ROOT_PASSWORD", "12345678"),
                default_bucket: env::var_or("MINIO_BUCKET_NAME", "uploads"),
                secure: env::bool_var("MINIO_SECURE", false),
                region: env::var_or("MINIO_REGION", "us-east-1"),
                operation_timeout_secs: env::parse_optional_var("MINIO_OPERATION_TIMEOUT_SECS")?,
            },
            upload: UploadConfig {
                max_file_size: env::parse_var("MAX_FILE_SIZE", DEFAULT_MAX_FILE_SIZE)?,
                allowed_extensions: normalize_extensions(env::list_var("ALLOWED_EXTENSIONS")),
            },
            logging: LoggingConfig {
                level: env::var_or("LOG_LEVEL", "info"),
                format: env::var_or("LOG_FORMAT", "pretty"),
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.upload.max_file_size == 0 {
            return Err(ConfigError::InvalidConfig("MAX_FILE_SIZE must be > 0".to_string()));
        }

        if self.storage.default_bucket.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "MINIO_BUCKET_NAME cannot be empty".to_string(),
            ));
        }

        if !is_valid_bucket_name(&self.storage.default_bucket) {
            return Err(ConfigError::InvalidConfig(format!(
                "MINIO_BUCKET_NAME '{}' is not a valid S3 bucket name",
                self.storage.default_bucket
            )));
        }

        if self.storage.operation_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "MINIO_OPERATION_TIMEOUT_SECS must be > 0 when set".to_string(),
            ));
        }

        self.log_config()?;
        Ok(())
    }

    pub fn log_config(&self) -> Result<LogConfig, ConfigError> {
        let level: LogLevel = self
            .logging
            .level
            .parse()
            .map_err(|e| ConfigError::InvalidConfig(format!("LOG_LEVEL: {}", e)))?;
        let format: LogFormat = self
            .logging
            .format
            .parse()
            .map_err(|e| ConfigError::InvalidConfig(format!("LOG_FORMAT: {}", e)))?;

        Ok(LogConfig {
            level,
            format,
            service_name: "storage-service".to_string(),
            ..LogConfig::default()
        })
    }
}

/// Lowercase, strip a leading dot, drop duplicates.
pub fn normalize_extensions(raw: Vec<String>) -> Vec<String> {
    let mut extensions: Vec<String> = Vec::with_capacity(raw.len());
    for ext in raw {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        if !ext.is_empty() && !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }
    extensions
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            storage: StorageConfig::default(),
            upload: UploadConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            endpoint: "http://localhost:9000".to_string(),
            access_key: "admin".to_string(),
            secret_key: "12345678".to_string(),
            default_bucket: "uploads".to_string(),
            secure: false,
            region: "us-east-1".to_string(),
            operation_timeout_secs: None,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: Vec::new(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
