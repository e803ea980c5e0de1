use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{DEFAULT_LIMIT, DEFAULT_MIN_SCORE};
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
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

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Which data store backend serves property records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Rest,
    Postgres,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    pub rest: Option<RestSettings>,
    pub postgres: Option<DatabaseSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestSettings {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    pub timeout_secs: Option<u64>,
}

fn default_table() -> String { "properties".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            redis_url: None,
            ttl_secs: None,
            l1_cache_size: None,
        }
    }
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_pool_size")]
    pub candidate_pool_size: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            candidate_pool_size: default_pool_size(),
            min_score: default_min_score(),
        }
    }
}

impl RecommendationSettings {
    /// Resolve the number of results for a request
    pub fn effective_limit(&self, requested: Option<u16>) -> usize {
        requested
            .map(usize::from)
            .unwrap_or(self.default_limit)
            .min(self.max_limit)
    }
}

fn default_limit() -> usize { DEFAULT_LIMIT }
fn default_max_limit() -> usize { 24 }
fn default_pool_size() -> usize { 50 }
fn default_min_score() -> f64 { DEFAULT_MIN_SCORE }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_property_type_weight")]
    pub property_type: f64,
    #[serde(default = "default_same_city_weight")]
    pub same_city: f64,
    #[serde(default = "default_same_state_weight")]
    pub same_state: f64,
    #[serde(default = "default_price_weight")]
    pub price: f64,
    #[serde(default = "default_bedrooms_weight")]
    pub bedrooms: f64,
    #[serde(default = "default_bathrooms_weight")]
    pub bathrooms: f64,
    #[serde(default = "default_area_weight")]
    pub area: f64,
    #[serde(default = "default_features_weight")]
    pub features: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            property_type: default_property_type_weight(),
            same_city: default_same_city_weight(),
            same_state: default_same_state_weight(),
            price: default_price_weight(),
            bedrooms: default_bedrooms_weight(),
            bathrooms: default_bathrooms_weight(),
            area: default_area_weight(),
            features: default_features_weight(),
        }
    }
}

impl From<WeightsConfig> for ScoringWeights {
    fn from(config: WeightsConfig) -> Self {
        Self {
            property_type: config.property_type,
            same_city: config.same_city,
            same_state: config.same_state,
            price: config.price,
            bedrooms: config.bedrooms,
            bathrooms: config.bathrooms,
            area: config.area,
            features: config.features,
        }
    }
}

fn default_property_type_weight() -> f64 { 25.0 }
fn default_same_city_weight() -> f64 { 20.0 }
fn default_same_state_weight() -> f64 { 10.0 }
fn default_price_weight() -> f64 { 20.0 }
fn default_bedrooms_weight() -> f64 { 10.0 }
fn default_bathrooms_weight() -> f64 { 5.0 }
fn default_area_weight() -> f64 { 10.0 }
fn default_features_weight() -> f64 { 10.0 }

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
    /// 4. Environment variables (prefixed with ESTATE__)
    /// 5. Well-known variables (DATABASE_URL, BACKEND_URL, BACKEND_API_KEY, REDIS_URL)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g., ESTATE__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        apply_well_known_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        apply_well_known_env(settings)?.try_deserialize()
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        self.scoring.weights.into()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("ESTATE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Override config values from the conventional deployment variables
fn apply_well_known_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("DATABASE_URL", "store.postgres.url"),
        ("BACKEND_URL", "store.rest.endpoint"),
        ("BACKEND_API_KEY", "store.rest.api_key"),
        ("REDIS_URL", "cache.redis_url"),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
