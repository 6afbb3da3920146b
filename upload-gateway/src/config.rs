/// Configuration for the Upload Gateway
///
/// Values come from environment variables (a `.env` file is loaded first when
/// present) with defaults for everything except the bucket name.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use shared::observability::{LogConfig, LogFormat, LogLevel};
use std::env;
use std::path::PathBuf;

use crate::storage::S3Config;

// Maximum request body: 100MB
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub s3: S3Config,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub include_line_numbers: bool,
    pub include_thread_ids: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            server: ServerConfig {
                host: var("SERVER_HOST", "0.0.0.0"),
                port: var("SERVER_PORT", "8000")
                    .parse()
                    .context("Invalid SERVER_PORT")?,
                max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                    Some(v) => v.parse().context("Invalid MAX_UPLOAD_BYTES")?,
                    None => DEFAULT_MAX_UPLOAD_BYTES,
                },
                enable_cors: var("ENABLE_CORS", "true")
                    .parse()
                    .context("Invalid ENABLE_CORS")?,
            },
            storage: StorageConfig {
                upload_root: PathBuf::from(var("UPLOAD_ROOT", "uploads")),
            },
            s3: S3Config {
                bucket: lookup("S3_BUCKET_NAME").context("S3_BUCKET_NAME must be set")?,
                region: var("S3_REGION", "us-east-1"),
                endpoint: lookup("S3_ENDPOINT").filter(|v| !v.is_empty()),
                access_key_id: lookup("S3_ACCESS_KEY_ID").filter(|v| !v.is_empty()),
                secret_access_key: lookup("S3_SECRET_ACCESS_KEY").filter(|v| !v.is_empty()),
                path_style: var("S3_FORCE_PATH_STYLE", "false")
                    .parse()
                    .context("Invalid S3_FORCE_PATH_STYLE")?,
            },
            logging: LoggingConfig {
                level: var("LOG_LEVEL", "info"),
                format: var("LOG_FORMAT", "pretty"),
                include_line_numbers: var("LOG_LINE_NUMBERS", "true")
                    .parse()
                    .context("Invalid LOG_LINE_NUMBERS")?,
                include_thread_ids: var("LOG_THREAD_IDS", "false")
                    .parse()
                    .context("Invalid LOG_THREAD_IDS")?,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port cannot be 0");
        }
        if self.server.max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be greater than 0");
        }
        if self.storage.upload_root.as_os_str().is_empty() {
            bail!("UPLOAD_ROOT cannot be empty");
        }
        self.logging.to_log_config("upload-gateway")?;
        self.s3.validate()
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self, service_name: &str) -> Result<LogConfig> {
        let level: LogLevel = self.level.parse()?;
        let format: LogFormat = self.format.parse()?;
        Ok(LogConfig {
            level,
            format,
            service_name: service_name.to_string(),
            include_line_numbers: self.include_line_numbers,
            include_thread_ids: self.include_thread_ids,
        })
    }
}
