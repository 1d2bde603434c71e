//! Environment-driven configuration (§6).
//!
//! Mirrors the teacher's client `from_env` constructors: read everything
//! with sane defaults, then validate once at startup rather than at every
//! call site.

use std::time::Duration;

use crate::provider_pool::{ProviderConfig, Resolution};

/// Maximum number of provider slots read from the environment.
const MAX_PROVIDER_SLOTS: usize = 8;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub render_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub providers: Vec<ProviderConfig>,
    /// Allowed CORS origin for the HTTP API. `None` means permissive
    /// (any origin), matching the teacher's default when unset.
    pub cors_origin: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(String),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

impl AppConfig {
    /// Build configuration from the process environment. Does not
    /// validate that the provider pool is non-empty - the caller decides
    /// whether an empty pool is a startup failure or an intentional
    /// offline-only deployment (§6 exit conditions).
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr =
            std::env::var("SCENE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let database_url = std::env::var("SCENE_DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("SCENE_DATABASE_URL".to_string()))?;

        let render_timeout = Duration::from_secs(parse_env_or(
            "SCENE_RENDER_TIMEOUT_SECONDS",
            45,
        )?);
        let max_retries = parse_env_or("SCENE_MAX_RETRIES", 2)?;
        let retry_delay = Duration::from_secs(parse_env_or("SCENE_RETRY_DELAY_SECONDS", 0)?);

        let providers = (0..MAX_PROVIDER_SLOTS)
            .filter_map(|i| provider_from_env(i))
            .collect::<Result<Vec<_>, _>>()?;

        if providers.is_empty() {
            tracing::warn!("no provider slots configured; the orchestrator will only ever produce offline scenes");
        }

        let cors_origin = std::env::var("SCENE_CORS_ORIGIN").ok().filter(|s| !s.is_empty());

        Ok(Self {
            bind_addr,
            database_url,
            render_timeout,
            max_retries,
            retry_delay,
            providers,
            cors_origin,
        })
    }

    /// `max_retries == 0` is a valid, if unusual, configuration: the
    /// background retry loop (§4.4) simply never runs, and a scene that
    /// fails its synchronous attempt stays `pending` indefinitely. That
    /// matches the original's handling of a non-positive retry count,
    /// which is a runtime state, not a startup error.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.trim().is_empty() {
            return Err("database URL must not be empty".to_string());
        }
        Ok(())
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            name: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Read a single `SCENE_PROVIDER_<i>_*` slot. Returns `None` when the
/// slot's API key is entirely absent, which is not an error - it just
/// means fewer provider slots than `MAX_PROVIDER_SLOTS` are in use.
fn provider_from_env(i: usize) -> Option<Result<ProviderConfig, ConfigError>> {
    let api_key_var = format!("SCENE_PROVIDER_{i}_API_KEY");
    let api_key = std::env::var(&api_key_var).ok()?;
    if api_key.is_empty() {
        return None;
    }

    let label = std::env::var(format!("SCENE_PROVIDER_{i}_LABEL"))
        .unwrap_or_else(|_| format!("provider-{i}"));
    let model = std::env::var(format!("SCENE_PROVIDER_{i}_MODEL"))
        .unwrap_or_else(|_| "default".to_string());

    let width = match parse_env_or(&format!("SCENE_PROVIDER_{i}_WIDTH"), 1024u32) {
        Ok(w) => w,
        Err(e) => return Some(Err(e)),
    };
    let height = match parse_env_or(&format!("SCENE_PROVIDER_{i}_HEIGHT"), 576u32) {
        Ok(h) => h,
        Err(e) => return Some(Err(e)),
    };

    Some(Ok(ProviderConfig {
        label,
        api_key: Some(api_key),
        model,
        resolution: Resolution { width, height },
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_zero_retries() {
        let cfg = AppConfig {
            bind_addr: "0.0.0.0:8080".into(),
            database_url: "sqlite://scenes.db".into(),
            render_timeout: Duration::from_secs(45),
            max_retries: 0,
            retry_delay: Duration::ZERO,
            providers: vec![],
            cors_origin: None,
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_database_url() {
        let cfg = AppConfig {
            bind_addr: "0.0.0.0:8080".into(),
            database_url: "   ".into(),
            render_timeout: Duration::from_secs(45),
            max_retries: 2,
            retry_delay: Duration::ZERO,
            providers: vec![],
            cors_origin: None,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_sane_defaults() {
        let cfg = AppConfig {
            bind_addr: "0.0.0.0:8080".into(),
            database_url: "sqlite://scenes.db".into(),
            render_timeout: Duration::from_secs(45),
            max_retries: 2,
            retry_delay: Duration::ZERO,
            providers: vec![],
            cors_origin: None,
        };
        assert!(cfg.validate().is_ok());
    }
}
