//! Configuration for fetching, forecasting and summarization

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variables checked for the Gemini API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = stockcast_llm::providers::gemini::API_KEY_ENV_VARS;

/// Where snapshots are cached on disk and for how long they stay valid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one JSON file per (symbol, period)
    pub dir: PathBuf,

    /// Entries whose file is older than this are treated as absent
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("cache"),
            ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Configuration for stockcast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockcastConfig {
    /// Snapshot cache location and expiry
    pub cache: CacheConfig,

    /// Number of trading days to forecast
    pub forecast_horizon: usize,

    /// Minimum history rows before a forecast is attempted
    pub min_history_rows: usize,

    /// Number of trailing samples the trend lines are drawn across
    pub trend_display_window: usize,

    /// Request timeout for the LLM client
    pub request_timeout: Duration,

    /// Gemini API key (optional; summaries are disabled without it)
    pub gemini_api_key: Option<String>,

    /// Gemini model used for summaries
    pub gemini_model: String,

    /// Maximum tokens generated per summary
    pub summary_max_tokens: usize,
}

impl Default for StockcastConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            forecast_horizon: 15,
            min_history_rows: 30,
            trend_display_window: 100,
            request_timeout: Duration::from_secs(30),
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            summary_max_tokens: 2048,
        }
    }
}

impl StockcastConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockcastConfigBuilder {
        StockcastConfigBuilder::default()
    }

    /// Load the Gemini API key from the environment if one is set
    pub fn with_env_api_key(mut self) -> Self {
        if let Some(key) = api_key_from_env() {
            self.gemini_api_key = Some(key);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.forecast_horizon == 0 {
            return Err(StockError::ConfigError(
                "forecast_horizon must be greater than 0".to_string(),
            ));
        }

        if self.min_history_rows < 6 {
            return Err(StockError::ConfigError(
                "min_history_rows must be at least 6 to fit the forecast model".to_string(),
            ));
        }

        if self.trend_display_window < 2 {
            return Err(StockError::ConfigError(
                "trend_display_window must be at least 2".to_string(),
            ));
        }

        if self.cache.ttl.is_zero() {
            return Err(StockError::ConfigError("cache ttl must be non-zero".to_string()));
        }

        if self.gemini_model.trim().is_empty() {
            return Err(StockError::ConfigError("gemini_model must not be empty".to_string()));
        }

        Ok(())
    }

    /// API key, if configured and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|key| !key.trim().is_empty()))
}

/// Builder for StockcastConfig
#[derive(Debug, Default)]
pub struct StockcastConfigBuilder {
    cache_dir: Option<PathBuf>,
    cache_ttl: Option<Duration>,
    forecast_horizon: Option<usize>,
    min_history_rows: Option<usize>,
    trend_display_window: Option<usize>,
    request_timeout: Option<Duration>,
    gemini_api_key: Option<String>,
    gemini_model: Option<String>,
    summary_max_tokens: Option<usize>,
}

impl StockcastConfigBuilder {
    /// Set the cache directory
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Set the cache TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Set the forecast horizon in trading days
    pub fn forecast_horizon(mut self, days: usize) -> Self {
        self.forecast_horizon = Some(days);
        self
    }

    /// Set the minimum history length for forecasting
    pub fn min_history_rows(mut self, rows: usize) -> Self {
        self.min_history_rows = Some(rows);
        self
    }

    /// Set the trend-line display window
    pub fn trend_display_window(mut self, samples: usize) -> Self {
        self.trend_display_window = Some(samples);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the Gemini API key
    pub fn gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(key.into());
        self
    }

    /// Set the Gemini model
    pub fn gemini_model(mut self, model: impl Into<String>) -> Self {
        self.gemini_model = Some(model.into());
        self
    }

    /// Set the summary token budget
    pub fn summary_max_tokens(mut self, tokens: usize) -> Self {
        self.summary_max_tokens = Some(tokens);
        self
    }

    /// Load the Gemini API key from `GEMINI_API_KEY` / `GOOGLE_API_KEY`
    pub fn with_env_api_key(mut self) -> Self {
        if let Some(key) = api_key_from_env() {
            self.gemini_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockcastConfig> {
        let defaults = StockcastConfig::default();

        let config = StockcastConfig {
            cache: CacheConfig {
                dir: self.cache_dir.unwrap_or(defaults.cache.dir),
                ttl: self.cache_ttl.unwrap_or(defaults.cache.ttl),
            },
            forecast_horizon: self.forecast_horizon.unwrap_or(defaults.forecast_horizon),
            min_history_rows: self.min_history_rows.unwrap_or(defaults.min_history_rows),
            trend_display_window: self
                .trend_display_window
                .unwrap_or(defaults.trend_display_window),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            gemini_api_key: self.gemini_api_key,
            gemini_model: self.gemini_model.unwrap_or(defaults.gemini_model),
            summary_max_tokens: self.summary_max_tokens.unwrap_or(defaults.summary_max_tokens),
        };

        config.validate()?;
        Ok(config)
    }
}
