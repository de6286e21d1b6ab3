//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, queue depths and CORS header values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SuggestConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::SuggestConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub fn validate_config(config: &SuggestConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }

    if config.store.insert_queue_depth == 0 {
        errors.push(ValidationError::new("store.insert_queue_depth", "must be at least 1"));
    }
    if config.store.lookup_queue_depth == 0 {
        errors.push(ValidationError::new("store.lookup_queue_depth", "must be at least 1"));
    }

    let cors = &config.cors;
    for origin in &cors.allow_origin {
        if origin != "*" && HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::new(
                "cors.allow_origin",
                format!("{origin:?} is not a valid header value"),
            ));
        }
    }
    if cors.allow_credentials && cors.allow_origin.iter().any(|o| o == "*") {
        errors.push(ValidationError::new(
            "cors.allow_credentials",
            "cannot be combined with a wildcard origin",
        ));
    }
    for (field, names) in [
        ("cors.expose_headers", &cors.expose_headers),
        ("cors.allow_headers", &cors.allow_headers),
    ] {
        for name in names {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                errors.push(ValidationError::new(
                    field,
                    format!("{name:?} is not a valid header name"),
                ));
            } else if name == "*" && cors.allow_credentials {
                errors.push(ValidationError::new(
                    field,
                    "a wildcard cannot be combined with allow_credentials",
                ));
            }
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
