//! Batch configuration: rate limit, concurrency, API access and naming.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::infra::vision::DEFAULT_API_BASE;

/// Configuration failures. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value parsed but is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// A configuration file is not valid JSON for [`BatchConfig`].
    #[error("parse error: {0}")]
    Parse(String),
    /// A configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Environment variable names.
pub mod env {
    /// Requests per minute.
    pub const RATE_PER_MINUTE: &str = "OPENAI_API_RATE_PER_MINUTE";
    /// Concurrent requests.
    pub const MAX_CONCURRENT: &str = "OPENAI_API_MAX_CONCURRENT";
    /// Bearer token.
    pub const API_KEY: &str = "OPENAI_API_KEY";
    /// API root.
    pub const API_BASE: &str = "OPENAI_API_BASE";
    /// Model name.
    pub const MODEL: &str = "OPENAI_MODEL";
    /// Per-request timeout.
    pub const TIMEOUT_SECS: &str = "OPENAI_API_TIMEOUT_SECS";
    /// Prompt text.
    pub const PROMPT_TEXT: &str = "PROMPT_TEXT";
    /// Replacement for the emote name placeholder.
    pub const EMOTE_NAME_PREFIX: &str = "EMOTENAME_PREFIX";
    /// Directory to run in.
    pub const WORKING_DIR: &str = "WORKING_DIR";
}

/// Everything needed to build and run a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Limiter capacity and per-minute refill rate.
    pub rate_per_minute: u32,
    /// Maximum simultaneous processor invocations.
    pub max_concurrent: usize,
    /// API bearer token.
    pub api_key: String,
    /// API root URL.
    pub api_base: String,
    /// Vision model name.
    pub model: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Prompt sent with every image.
    pub prompt_text: String,
    /// Replacement for the emote name placeholder.
    pub emote_name_prefix: String,
    /// Directory to change into before processing.
    pub working_dir: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            rate_per_minute: 60,
            max_concurrent: 1,
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: "gpt-4o".to_string(),
            request_timeout_secs: 120,
            prompt_text: String::new(),
            emote_name_prefix: String::new(),
            working_dir: None,
        }
    }
}

impl BatchConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero rate, concurrency or
    /// timeout, or an empty API base or model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "rate_per_minute must be greater than 0".into(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent must be greater than 0".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base must not be empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        Ok(())
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build configuration from a key lookup, starting from the defaults.
    ///
    /// Unset and empty values keep the default. Numeric values that do not
    /// parse keep the default and are logged. Nothing is validated here.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        cfg.rate_per_minute = parse_or(
            get(env::RATE_PER_MINUTE),
            env::RATE_PER_MINUTE,
            cfg.rate_per_minute,
        );
        cfg.max_concurrent = parse_or(
            get(env::MAX_CONCURRENT),
            env::MAX_CONCURRENT,
            cfg.max_concurrent,
        );
        cfg.request_timeout_secs = parse_or(
            get(env::TIMEOUT_SECS),
            env::TIMEOUT_SECS,
            cfg.request_timeout_secs,
        );
        if let Some(v) = get(env::API_KEY) {
            cfg.api_key = v;
        }
        if let Some(v) = get(env::API_BASE) {
            cfg.api_base = v;
        }
        if let Some(v) = get(env::MODEL) {
            cfg.model = v;
        }
        if let Some(v) = get(env::PROMPT_TEXT) {
            cfg.prompt_text = v;
        }
        if let Some(v) = get(env::EMOTE_NAME_PREFIX) {
            cfg.emote_name_prefix = v;
        }
        cfg.working_dir = get(env::WORKING_DIR).map(PathBuf::from);
        cfg
    }

    /// Build configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// As [`from_json_str`](Self::from_json_str), plus [`ConfigError::Io`]
    /// if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json_str(&input)
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = value else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(key, value = %raw, default = %default, "unparseable value, using default");
        default
    })
}
