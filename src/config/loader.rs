//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::schema::ProxyConfig;

/// Listen port.
pub const ENV_PORT: &str = "PORT";
/// Log verbosity name.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Upstream fetch deadline in seconds.
pub const ENV_UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
/// Inbound body limit in bytes.
pub const ENV_MAX_BODY_BYTES: &str = "MAX_BODY_BYTES";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Load configuration from an optional TOML file, then apply environment overrides.
pub fn load(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    load_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load`], reading the environment through `lookup`.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => from_file(path)?,
        None => ProxyConfig::default(),
    };
    apply_env(&mut config, lookup)?;
    Ok(config)
}

/// Parse a TOML config file. Missing sections fall back to defaults.
pub fn from_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply environment overrides. Unset and empty variables leave the value untouched.
pub fn apply_env<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = get(ENV_PORT) {
        config.listener.port = parse_env(ENV_PORT, &port)?;
    }
    if let Some(bytes) = get(ENV_MAX_BODY_BYTES) {
        config.listener.max_body_bytes = parse_env(ENV_MAX_BODY_BYTES, &bytes)?;
    }
    if let Some(secs) = get(ENV_UPSTREAM_TIMEOUT_SECS) {
        config.upstream.timeout_secs = parse_env(ENV_UPSTREAM_TIMEOUT_SECS, &secs)?;
    }
    // Unparsable level names are resolved to `info` when the logger is built.
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }
    Ok(())
}

fn parse_env<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}
