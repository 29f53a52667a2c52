//! Configuration management
//!
//! This module handles loading and parsing configuration for Newsdesk.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::models::Period;
use crate::trending::scoring::{
    DEFAULT_COMMENTS_CEILING, DEFAULT_COMMENTS_WEIGHT, DEFAULT_RECENCY_WEIGHT,
    DEFAULT_VIEWS_CEILING, DEFAULT_VIEWS_WEIGHT,
};
use crate::trending::{CeilingMode, Ceilings, ScoringConfig, Weights};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Trending configuration
    #[serde(default)]
    pub trending: TrendingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL (`:memory:` for an in-memory database)
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "data/newsdesk.db".to_string()
}

fn default_max_connections() -> u32 {
    20
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of cached entries
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_ttl() -> u64 {
    3600
}

fn default_max_capacity() -> u64 {
    10_000
}

/// Trending ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingConfig {
    /// Window used when a request does not name one
    #[serde(default)]
    pub default_period: Period,
    #[serde(default = "default_views_weight")]
    pub views_weight: u32,
    #[serde(default = "default_comments_weight")]
    pub comments_weight: u32,
    #[serde(default = "default_recency_weight")]
    pub recency_weight: u32,
    /// View count that earns the full views weight
    #[serde(default = "default_views_ceiling")]
    pub views_ceiling: u64,
    /// Comment count that earns the full comments weight
    #[serde(default = "default_comments_ceiling")]
    pub comments_ceiling: u64,
    #[serde(default)]
    pub ceiling_mode: CeilingMode,
    /// How long a ranked list is served from cache
    #[serde(default = "default_trending_cache_ttl")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            default_period: Period::default(),
            views_weight: default_views_weight(),
            comments_weight: default_comments_weight(),
            recency_weight: default_recency_weight(),
            views_ceiling: default_views_ceiling(),
            comments_ceiling: default_comments_ceiling(),
            ceiling_mode: CeilingMode::default(),
            cache_ttl_seconds: default_trending_cache_ttl(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_views_weight() -> u32 {
    DEFAULT_VIEWS_WEIGHT
}

fn default_comments_weight() -> u32 {
    DEFAULT_COMMENTS_WEIGHT
}

fn default_recency_weight() -> u32 {
    DEFAULT_RECENCY_WEIGHT
}

fn default_views_ceiling() -> u64 {
    DEFAULT_VIEWS_CEILING
}

fn default_comments_ceiling() -> u64 {
    DEFAULT_COMMENTS_CEILING
}

fn default_trending_cache_ttl() -> u64 {
    300
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    50
}

impl TrendingConfig {
    /// Build the scoring configuration for `period`
    pub fn scoring_config(&self, period: Period) -> Result<ScoringConfig, ConfigError> {
        let weights = Weights::new(self.views_weight, self.comments_weight, self.recency_weight)
            .map_err(|e| ConfigError::ValidationError(format!("trending: {}", e)))?;
        let ceilings = Ceilings::new(self.views_ceiling, self.comments_ceiling)
            .map_err(|e| ConfigError::ValidationError(format!("trending: {}", e)))?;
        Ok(ScoringConfig::new(period, weights, ceilings))
    }

    /// Clamp a requested list length into `1..=max_limit`
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML or fails validation, returns an error.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - NEWSDESK_SERVER_HOST
    /// - NEWSDESK_SERVER_PORT
    /// - NEWSDESK_SERVER_CORS_ORIGIN
    /// - NEWSDESK_DATABASE_URL
    /// - NEWSDESK_CACHE_TTL_SECONDS
    /// - NEWSDESK_TRENDING_PERIOD
    /// - NEWSDESK_TRENDING_VIEWS_CEILING
    /// - NEWSDESK_TRENDING_COMMENTS_CEILING
    /// - NEWSDESK_TRENDING_CEILING_MODE
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trending.scoring_config(self.trending.default_period)?;

        if self.trending.default_limit == 0 || self.trending.max_limit == 0 {
            return Err(ConfigError::ValidationError(
                "trending: limits must be at least 1".to_string(),
            ));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database: url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NEWSDESK_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("NEWSDESK_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("NEWSDESK_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("NEWSDESK_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(ttl) = std::env::var("NEWSDESK_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = ttl;
            }
        }

        if let Ok(period) = std::env::var("NEWSDESK_TRENDING_PERIOD") {
            if let Some(period) = Period::from_str(&period) {
                self.trending.default_period = period;
            }
        }
        if let Ok(ceiling) = std::env::var("NEWSDESK_TRENDING_VIEWS_CEILING") {
            if let Ok(ceiling) = ceiling.parse::<u64>() {
                self.trending.views_ceiling = ceiling;
            }
        }
        if let Ok(ceiling) = std::env::var("NEWSDESK_TRENDING_COMMENTS_CEILING") {
            if let Ok(ceiling) = ceiling.parse::<u64>() {
                self.trending.comments_ceiling = ceiling;
            }
        }
        if let Ok(mode) = std::env::var("NEWSDESK_TRENDING_CEILING_MODE") {
            if let Some(mode) = CeilingMode::from_str(&mode) {
                self.trending.ceiling_mode = mode;
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared by every test that touches process environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
