//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// Default OpenAI-compatible endpoint of the Gemini API.
pub const DEFAULT_LLM_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub gemini_api_key: Option<String>,
    pub llm_api_base: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub openai_api_key: Option<String>,
    pub stt_model: String,
    /// `None` keeps every generated batch for the life of the process.
    pub flashcard_cache_capacity: Option<usize>,
    pub session_ttl: chrono::Duration,
    pub session_cookie_secure: bool,
    pub cors_origin: HeaderValue,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address: SocketAddr = parse_var("BIND_ADDRESS", "0.0.0.0:5000")?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let gemini_api_key = non_empty_var("GEMINI_API_KEY");
        let openai_api_key = non_empty_var("OPENAI_API_KEY");

        // --- Load Adapter-specific Settings ---
        let llm_api_base =
            std::env::var("LLM_API_BASE").unwrap_or_else(|_| DEFAULT_LLM_API_BASE.to_string());
        let llm_model =
            std::env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let llm_timeout = Duration::from_secs(parse_var("LLM_TIMEOUT_SECS", "60")?);
        let stt_model = std::env::var("STT_MODEL").unwrap_or_else(|_| "whisper-1".to_string());

        // --- Load Cache and Session Settings ---
        let cache_capacity: usize = parse_var("FLASHCARD_CACHE_CAPACITY", "0")?;
        let flashcard_cache_capacity = (cache_capacity > 0).then_some(cache_capacity);

        let session_ttl = chrono::Duration::days(parse_var("SESSION_TTL_DAYS", "30")?);
        let session_cookie_secure = parse_var("SESSION_COOKIE_SECURE", "false")?;

        let cors_origin_str =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let cors_origin = cors_origin_str.parse::<HeaderValue>().map_err(|e| {
            ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
        })?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            gemini_api_key,
            llm_api_base,
            llm_model,
            llm_timeout,
            openai_api_key,
            stt_model,
            flashcard_cache_capacity,
            session_ttl,
            session_cookie_secure,
            cors_origin,
        })
    }
}

/// Reads `name`, falling back to `default`, and parses it into `T`.
fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
