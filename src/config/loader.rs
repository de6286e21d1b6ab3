//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::SuggestConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var} env variable: {value:?} ({reason})")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<SuggestConfig, ConfigError> {
    let mut config: SuggestConfig = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => SuggestConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Empty variables are treated as unset. Any value that fails to parse is
/// an error.
pub fn apply_env_overrides<F>(config: &mut SuggestConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(addr) = get("ADDR") {
        // ":8080" listens on every interface.
        config.listener.bind_address = match addr.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => addr,
        };
    }

    if let Some(value) = get("TRIE_INSERTION_BUFFER") {
        config.store.insert_queue_depth = parse_env("TRIE_INSERTION_BUFFER", &value)?;
    }
    if let Some(value) = get("TRIE_RETRIEVE_BUFFER") {
        config.store.lookup_queue_depth = parse_env("TRIE_RETRIEVE_BUFFER", &value)?;
    }
    if let Some(value) = get("TRIE_REQUEST_TIMEOUT_MS") {
        config.store.request_timeout_ms = parse_env("TRIE_REQUEST_TIMEOUT_MS", &value)?;
    }

    if let Some(value) = get("CORS_ALLOW_ORIGIN") {
        config.cors.allow_origin = split_list(&value);
    }
    if let Some(value) = get("CORS_ALLOW_CREDENTIALS") {
        config.cors.allow_credentials = parse_env("CORS_ALLOW_CREDENTIALS", &value)?;
    }
    if let Some(value) = get("CORS_EXPOSE_HEADERS") {
        config.cors.expose_headers = split_list(&value);
    }
    if let Some(value) = get("CORS_ALLOW_HEADERS") {
        config.cors.allow_headers = split_list(&value);
    }
    if let Some(value) = get("CORS_MAX_AGE") {
        config.cors.max_age_secs = parse_duration_secs(&value).ok_or_else(|| ConfigError::Env {
            var: "CORS_MAX_AGE",
            value: value.clone(),
            reason: "expected seconds, optionally suffixed with s, m or h".to_string(),
        })?;
    }

    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(addr) = get("METRICS_ADDR") {
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = addr;
    }

    if let Some(value) = get("MAX_BODY_SIZE") {
        config.security.max_body_size = parse_env("MAX_BODY_SIZE", &value)?;
    }
    if let Some(value) = get("STRICT_VALIDATION") {
        config.security.strict_validation = parse_env("STRICT_VALIDATION", &value)?;
    }

    Ok(())
}

fn parse_env<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse "90", "90s", "5m" or "1h" into seconds.
fn parse_duration_secs(value: &str) -> Option<u64> {
    let value = value.trim();
    let (digits, scale) = match value.char_indices().last()? {
        (i, 's') => (&value[..i], 1),
        (i, 'm') => (&value[..i], 60),
        (i, 'h') => (&value[..i], 3600),
        _ => (value, 1),
    };
    digits.parse::<u64>().ok()?.checked_mul(scale)
}
