use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

use crate::models::{default_catalog, Catalog, Product};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_DATA_FILE: &str = "data/inventory.json";
const DEFAULT_TRASH_WINDOW_DAYS: i64 = 90;
const DEFAULT_TOP_PRODUCTS_LIMIT: usize = 5;
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application environment
    #[validate(length(min = 1))]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// JSON document holding the catalog and all inventory records
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Product list that records without unit information were captured
    /// against. The built-in catalog is used when unset.
    #[serde(default)]
    pub baseline_catalog_file: Option<PathBuf>,

    /// How many days back the trash reaches
    #[serde(default = "default_trash_window_days")]
    #[validate(range(min = 1))]
    pub trash_window_days: i64,

    /// Number of products listed in the analytics top list
    #[serde(default = "default_top_products_limit")]
    #[validate(range(min = 1))]
    pub top_products_limit: usize,

    /// Capacity of the inventory event channel
    #[serde(default = "default_event_channel_capacity")]
    #[validate(custom = "validate_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENV.to_string(),
            log_level: default_log_level(),
            log_json: false,
            data_file: default_data_file(),
            baseline_catalog_file: None,
            trash_window_days: default_trash_window_days(),
            top_products_limit: default_top_products_limit(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Catalog that legacy inventory records are interpreted against.
    pub fn baseline_catalog(&self) -> Result<Catalog, AppConfigError> {
        let path = match &self.baseline_catalog_file {
            Some(path) => path,
            None => return Ok(default_catalog()),
        };

        let raw = std::fs::read_to_string(path)?;
        let products: Vec<Product> = serde_json::from_str(&raw).map_err(|e| {
            error!(path = %path.display(), error = %e, "Invalid baseline catalog");
            AppConfigError::Catalog(e)
        })?;
        for product in &products {
            product.validate()?;
        }
        info!(path = %path.display(), products = products.len(), "Baseline catalog loaded");
        Ok(Catalog::new(products))
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Baseline catalog is not valid JSON: {0}")]
    Catalog(#[from] serde_json::Error),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_trash_window_days() -> i64 {
    DEFAULT_TRASH_WINDOW_DAYS
}

fn default_top_products_limit() -> usize {
    DEFAULT_TOP_PRODUCTS_LIMIT
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

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

fn validate_event_channel_capacity(capacity: usize) -> Result<(), ValidationError> {
    if capacity == 0 {
        let mut err = ValidationError::new("event_channel_capacity");
        err.message = Some("event_channel_capacity must be greater than 0".into());
        return Err(err);
    }
    Ok(())
}

/// Loads configuration from `config/` in the working directory, selecting the
/// profile through `APP_ENV` (or `RUN_ENV`).
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    load_config_from(Path::new(CONFIG_DIR), &run_env)
}

/// Layers built-in defaults, `<dir>/default`, `<dir>/<run_env>` and `APP__*`
/// environment variables, then validates the result.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, AppConfigError> {
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("environment", run_env)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&config_dir.join("default").to_string_lossy()).required(false))
        .add_source(File::with_name(&config_dir.join(run_env).to_string_lossy()).required(false))
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
