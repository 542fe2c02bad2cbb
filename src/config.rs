//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup. For local development a `.env` file is
//! honored via `dotenvy`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::models::DEFAULT_FACTORS_VERSION;

const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_AI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIP_COUNT: usize = 3;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Server ---
    /// Frontend URL (allowed CORS origin)
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Keep activities in process memory instead of Firestore
    pub use_in_memory_store: bool,

    // --- Emissions ---
    /// Active emission factor table version
    pub factors_version: String,

    // --- Tips ---
    /// Generative Language API key; tips fall back to the general pool without it
    pub ai_api_key: Option<String>,
    pub ai_base_url: String,
    pub ai_model: String,
    /// Upper bound on a single tips request
    pub ai_timeout: Duration,
    /// Number of tips shown at once
    pub tip_count: usize,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:9002".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            use_in_memory_store: true,
            factors_version: DEFAULT_FACTORS_VERSION.to_string(),
            ai_api_key: None,
            ai_base_url: DEFAULT_AI_BASE_URL.to_string(),
            ai_model: DEFAULT_AI_MODEL.to_string(),
            ai_timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            tip_count: DEFAULT_TIP_COUNT,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let ai_api_key = env::var("GOOGLE_AI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:9002".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_var("PORT", 8080)?,
            use_in_memory_store: parse_var("USE_IN_MEMORY_STORE", false)?,
            factors_version: env::var("EMISSION_FACTORS_VERSION")
                .unwrap_or_else(|_| DEFAULT_FACTORS_VERSION.to_string()),
            ai_api_key,
            ai_base_url: env::var("AI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_AI_BASE_URL.to_string()),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
            ai_timeout: Duration::from_secs(parse_var("AI_TIMEOUT_SECS", DEFAULT_AI_TIMEOUT_SECS)?),
            tip_count: parse_nonzero_var("TIP_COUNT", DEFAULT_TIP_COUNT)?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Like [`parse_var`], but zero is rejected.
fn parse_nonzero_var(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match parse_var(name, default)? {
        0 => Err(ConfigError::Invalid(name, "0".to_string())),
        value => Ok(value),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
