use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

use crate::{
    errors::StorageError,
    models::{default_catalog, Product},
    storage::{
        FileStore, InMemoryStore, JsonStorage, Storage, DEFAULT_LEDGER_KEY,
        DEFAULT_ORDER_LOG_KEY,
    },
};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_DATA_DIR: &str = "data";
const CONFIG_DIR: &str = "config";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StorageBackend {
    /// JSON files under `data_dir`
    File,
    /// Nothing survives the process
    InMemory,
}

/// Where the ledger and order log live
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[validate(length(min = 1))]
    #[serde(default = "default_ledger_key")]
    pub ledger_key: String,

    #[validate(length(min = 1))]
    #[serde(default = "default_order_log_key")]
    pub order_log_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
            ledger_key: default_ledger_key(),
            order_log_key: default_order_log_key(),
        }
    }
}

impl StorageConfig {
    /// Opens the configured backend.
    pub fn open(&self) -> Result<Box<dyn Storage>, StorageError> {
        Ok(match self.backend {
            StorageBackend::File => Box::new(JsonStorage::with_keys(
                FileStore::open(&self.data_dir)?,
                &self.ledger_key,
                &self.order_log_key,
            )),
            StorageBackend::InMemory => Box::new(JsonStorage::with_keys(
                InMemoryStore::new(),
                &self.ledger_key,
                &self.order_log_key,
            )),
        })
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    #[validate]
    pub storage: StorageConfig,

    /// Products on the count sheet
    #[serde(default = "default_catalog")]
    #[validate(custom = "validate_catalog")]
    pub products: Vec<Product>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            storage: StorageConfig::default(),
            products: default_catalog(),
        }
    }
}

impl AppConfig {
    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_backend() -> StorageBackend {
    StorageBackend::File
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_ledger_key() -> String {
    DEFAULT_LEDGER_KEY.to_string()
}

fn default_order_log_key() -> String {
    DEFAULT_ORDER_LOG_KEY.to_string()
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_catalog(products: &Vec<Product>) -> Result<(), ValidationError> {
    if products.is_empty() {
        let mut err = ValidationError::new("products");
        err.message = Some("At least one product is required".into());
        return Err(err);
    }

    let mut ids: Vec<_> = products.iter().map(|p| p.id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != products.len() {
        let mut err = ValidationError::new("products");
        err.message = Some("Product ids must be unique".into());
        return Err(err);
    }

    if products.iter().any(|p| p.validate().is_err()) {
        let mut err = ValidationError::new("products");
        err.message = Some("Product names must not be empty".into());
        return Err(err);
    }

    Ok(())
}

/// Initializes tracing using the provided log level as the default filter.
/// Logs go to stderr so command output on stdout stays parseable.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("bun_count={}", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_writer(std::io::stderr)
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Loads application configuration from `./config`.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. `{dir}/default.toml`
/// 3. `{dir}/{env}.toml`, env taken from RUN_ENV or APP_ENV
/// 4. Environment variables (APP__*)
pub fn load_config_from(dir: &Path) -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            dir.display()
        );
    }

    let config = Config::builder()
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false))
        .add_source(File::with_name(&dir.join(&run_env).to_string_lossy()).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn write_default(dir: &TempDir, content: &str) {
        fs::write(dir.path().join("default.toml"), content).unwrap();
    }

    #[test]
    fn defaults_apply_without_files() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_from(&tmp.path().join("missing")).unwrap();

        assert_eq!(config.log_level(), "info");
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.ledger_key, "bun-count-inventory");
        assert_eq!(config.storage.order_log_key, "bun-count-orders");
        assert_eq!(config.products, default_catalog());
    }

    #[test]
    fn file_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        write_default(
            &tmp,
            r#"
            log_level = "debug"

            [storage]
            backend = "in-memory"
            data_dir = "/var/lib/bun-count"

            [[products]]
            id = 7
            name = "Brioche"
            bunsPerBag = 6
            orderIncrement = 4
            "#,
        );

        let config = load_config_from(tmp.path()).unwrap();
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.storage.backend, StorageBackend::InMemory);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/bun-count"));
        assert_eq!(config.products.len(), 1);
        assert_eq!(config.products[0].name, "Brioche");
        assert_eq!(config.products[0].increment(), 4);
    }

    #[test]
    fn invalid_log_level_fails_validation() {
        let tmp = TempDir::new().unwrap();
        write_default(&tmp, r#"log_level = "loud""#);
        assert_matches!(load_config_from(tmp.path()), Err(AppConfigError::Validation(_)));
    }

    #[test]
    fn duplicate_product_ids_fail_validation() {
        let mut config = AppConfig::default();
        config.products.push(config.products[0].clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!(StorageBackend::from_str("in-memory").unwrap(), StorageBackend::InMemory);
        assert_eq!(StorageBackend::File.to_string(), "file");
    }

    #[test]
    fn in_memory_backend_opens() {
        let config = StorageConfig {
            backend: StorageBackend::InMemory,
            ..StorageConfig::default()
        };
        let storage = config.open().unwrap();
        assert!(storage.load_ledger().unwrap().is_empty());
    }
}
