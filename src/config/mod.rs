//! Runtime configuration.
//!
//! `Config::from_env` reads environment variables and falls back to
//! development defaults for anything unset. Optional services (the browser
//! service, the language model, a custom source registry) stay disabled
//! when their variable is absent.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_BROWSERLESS_URL: &str = "BROWSERLESS_URL";
pub const ENV_BROWSERLESS_TOKEN: &str = "BROWSERLESS_TOKEN";
pub const ENV_LLM_BASE_URL: &str = "LLM_BASE_URL";
pub const ENV_LLM_API_KEY: &str = "LLM_API_KEY";
pub const ENV_LLM_MODEL: &str = "LLM_MODEL";
pub const ENV_LLM_TIMEOUT_SECS: &str = "LLM_TIMEOUT_SECS";
pub const ENV_NAVIGATION_TIMEOUT_SECS: &str = "NAVIGATION_TIMEOUT_SECS";
pub const ENV_DOM_READY_TIMEOUT_SECS: &str = "DOM_READY_TIMEOUT_SECS";
pub const ENV_SOURCES_PATH: &str = "SOURCES_PATH";
pub const ENV_RATE_LIMIT_MAX_REQUESTS: &str = "RATE_LIMIT_MAX_REQUESTS";
pub const ENV_RATE_LIMIT_WINDOW_SECS: &str = "RATE_LIMIT_WINDOW_SECS";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DOM_READY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: usize = 30;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    browserless_url: Option<String>,
    browserless_token: Option<String>,
    llm_base_url: String,
    llm_api_key: Option<String>,
    llm_model: String,
    llm_timeout: Duration,
    navigation_timeout: Duration,
    dom_ready_timeout: Duration,
    sources_path: Option<PathBuf>,
    rate_limit_max_requests: usize,
    rate_limit_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            browserless_url: None,
            browserless_token: None,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            dom_ready_timeout: Duration::from_secs(DEFAULT_DOM_READY_TIMEOUT_SECS),
            sources_path: None,
            rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            bind_addr: string_or(ENV_BIND_ADDR, defaults.bind_addr),
            browserless_url: optional(ENV_BROWSERLESS_URL),
            browserless_token: optional(ENV_BROWSERLESS_TOKEN),
            llm_base_url: string_or(ENV_LLM_BASE_URL, defaults.llm_base_url),
            llm_api_key: optional(ENV_LLM_API_KEY),
            llm_model: string_or(ENV_LLM_MODEL, defaults.llm_model),
            llm_timeout: secs_or(ENV_LLM_TIMEOUT_SECS, DEFAULT_LLM_TIMEOUT_SECS)?,
            navigation_timeout: secs_or(ENV_NAVIGATION_TIMEOUT_SECS, DEFAULT_NAVIGATION_TIMEOUT_SECS)?,
            dom_ready_timeout: secs_or(ENV_DOM_READY_TIMEOUT_SECS, DEFAULT_DOM_READY_TIMEOUT_SECS)?,
            sources_path: optional(ENV_SOURCES_PATH).map(PathBuf::from),
            rate_limit_max_requests: parsed_or(ENV_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_MAX_REQUESTS)?,
            rate_limit_window: secs_or(ENV_RATE_LIMIT_WINDOW_SECS, DEFAULT_RATE_LIMIT_WINDOW_SECS)?,
        })
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Base URL of the headless browser service. Without one, pages are
    /// fetched as static HTML.
    pub fn browserless_url(&self) -> Option<&str> {
        self.browserless_url.as_deref()
    }

    pub fn browserless_token(&self) -> Option<&str> {
        self.browserless_token.as_deref()
    }

    pub fn llm_base_url(&self) -> &str {
        &self.llm_base_url
    }

    /// Without a key, every rewrite uses the deterministic fallback.
    pub fn llm_api_key(&self) -> Option<&str> {
        self.llm_api_key.as_deref()
    }

    pub fn llm_model(&self) -> &str {
        &self.llm_model
    }

    pub fn llm_timeout(&self) -> Duration {
        self.llm_timeout
    }

    pub fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    pub fn dom_ready_timeout(&self) -> Duration {
        self.dom_ready_timeout
    }

    /// Registry JSON to load instead of the built-in source list.
    pub fn sources_path(&self) -> Option<&PathBuf> {
        self.sources_path.as_ref()
    }

    pub fn rate_limit_max_requests(&self) -> usize {
        self.rate_limit_max_requests
    }

    pub fn rate_limit_window(&self) -> Duration {
        self.rate_limit_window
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Unset and blank are treated the same.
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn string_or(key: &str, default: String) -> String {
    optional(key).unwrap_or(default)
}

fn parsed_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: key,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}

fn secs_or(key: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let secs = parsed_or(key, default)?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            field: key,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
