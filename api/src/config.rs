use std::{env, fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub bind_addr: String,
    /// Prefix for URLs handed out by the media store, without trailing slash.
    pub media_base_url: String,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so tests don't touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            jwt_secret,
            bind_addr: try_load(&lookup, "BIND_ADDR", "0.0.0.0:3000")?,
            media_base_url: try_load::<String, _>(
                &lookup,
                "MEDIA_BASE_URL",
                "http://localhost:3000/media",
            )?
            .trim_end_matches('/')
            .to_string(),
            max_body_bytes: try_load(&lookup, "MAX_BODY_BYTES", "10485760")?,
            request_timeout: Duration::from_secs(try_load(&lookup, "REQUEST_TIMEOUT_SECS", "30")?),
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}
