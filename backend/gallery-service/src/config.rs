/// Configuration management for gallery-service
///
/// Loads configuration from environment variables (and an optional `.env`
/// file) with sensible defaults.
use serde::Deserialize;
use std::path::PathBuf;

use crate::upload::UploadLimits;

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub upload: UploadLimits,
    pub view_counter: ViewCounterConfig,
    pub export: ExportConfig,
}

/// `HOST`, `PORT`, `APP_ENV`, `INDEX_PATH`
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
}

/// `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// `VIEW_COUNTER_QUEUE_CAPACITY`
#[derive(Clone, Debug, Deserialize)]
pub struct ViewCounterConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// `EXPORT_FILE_NAME`, `EXPORT_LEGACY_UNQUOTED`
#[derive(Clone, Debug, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
    /// Write titles and file names verbatim, even when they contain commas,
    /// quotes or line breaks.
    #[serde(default)]
    pub legacy_unquoted: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars().collect())
    }

    /// Build configuration from an explicit set of variables
    pub fn from_vars(vars: Vec<(String, String)>) -> Result<Self, envy::Error> {
        Ok(Config {
            app: envy::from_iter(vars.clone())?,
            database: envy::prefixed("DATABASE_").from_iter(vars.clone())?,
            upload: envy::prefixed("UPLOAD_").from_iter(vars.clone())?,
            view_counter: envy::prefixed("VIEW_COUNTER_").from_iter(vars.clone())?,
            export: envy::prefixed("EXPORT_").from_iter(vars)?,
        })
    }
}

impl AppConfig {
    /// Development builds echo internal error details to the caller.
    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            app_env: default_app_env(),
            index_path: default_index_path(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for ViewCounterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file_name(),
            legacy_unquoted: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_app_env() -> String {
    "production".to_string()
}

fn default_index_path() -> PathBuf {
    PathBuf::from("./index.html")
}

fn default_database_url() -> String {
    "postgres://localhost/gallery".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_export_file_name() -> String {
    "export.csv".to_string()
}
