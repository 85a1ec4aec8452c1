//! Configuration for reaching the hosted auth + table service.

use thiserror::Error;
use url::Url;

/// Environment variable naming the service base url.
pub const URL_ENV: &str = "SEWAPORTAL_URL";

/// Environment variable naming the public (anon) API key.
pub const ANON_KEY_ENV: &str = "SEWAPORTAL_ANON_KEY";

/// Errors raised while assembling a [`ServiceConfig`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("Missing required environment variable: {name}")]
    MissingEnv { name: &'static str },

    /// The service url did not parse.
    #[error("Invalid service url '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
}

/// Connection settings for the hosted service.
///
/// The anon key authenticates the application itself; per-user authorization
/// is carried by the access token the auth endpoint issues after sign-in.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Base url of the hosted service (auth and table endpoints hang off it).
    pub url: Url,
    /// Public API key sent with every request.
    pub anon_key: String,
}

impl ServiceConfig {
    /// Build a config from explicit values.
    pub fn new(url: &str, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            value: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            url,
            anon_key: anon_key.into(),
        })
    }

    /// Build a config from `SEWAPORTAL_URL` and `SEWAPORTAL_ANON_KEY`.
    ///
    /// Fails eagerly when either is unset, matching the hosted client's
    /// construction-time check rather than failing on first request.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = read_env(URL_ENV)?;
        let anon_key = read_env(ANON_KEY_ENV)?;
        Self::new(&url, anon_key)
    }
}

fn read_env(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnv { name }),
    }
}
