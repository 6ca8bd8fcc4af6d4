//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use tracing::Level;

/// Upper bound for `TOKEN_TTL_DAYS`.
pub const MAX_TOKEN_TTL_DAYS: i64 = 365;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where records are kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { database_url: String },
    /// Process-local; everything is lost on restart.
    Memory,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub storage: StorageBackend,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub analysis_model: String,
    pub token_ttl_days: i64,
    pub cors_origin: String,
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
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address = parse_var(&lookup, "BIND_ADDRESS", "0.0.0.0:3000")?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Storage ---
        let backend = lookup("STORAGE_BACKEND").unwrap_or_else(|| "postgres".to_string());
        let storage = match backend.to_lowercase().as_str() {
            "postgres" => StorageBackend::Postgres {
                database_url: lookup("DATABASE_URL")
                    .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORAGE_BACKEND".to_string(),
                    format!("'{}' is neither 'postgres' nor 'memory'", other),
                ))
            }
        };

        // --- AI Analysis (optional) ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty());
        let analysis_model = lookup("ANALYSIS_MODEL").unwrap_or_else(|| "gpt-4o".to_string());

        // --- Auth & CORS ---
        let token_ttl_days: i64 = parse_var(&lookup, "TOKEN_TTL_DAYS", "7")?;
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&token_ttl_days) {
            return Err(ConfigError::InvalidValue(
                "TOKEN_TTL_DAYS".to_string(),
                format!("must be between 1 and {}", MAX_TOKEN_TTL_DAYS),
            ));
        }
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        Ok(Self {
            bind_address,
            storage,
            log_level,
            openai_api_key,
            analysis_model,
            token_ttl_days,
            cors_origin,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}
