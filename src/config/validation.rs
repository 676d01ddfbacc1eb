//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ReconConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ReconConfig;

/// A single semantic validation failure.
#[derive(Debug)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Semantic checks on a deserialized configuration.
pub fn validate_config(config: &ReconConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a socket address: {:?}", config.listener.bind_address),
        });
    }

    if config.tarpit.max_chunks == 0 {
        errors.push(ValidationError {
            field: "tarpit.max_chunks",
            message: "must be at least 1".into(),
        });
    }
    if config.tarpit.chunk_bytes == 0 {
        errors.push(ValidationError {
            field: "tarpit.chunk_bytes",
            message: "must be at least 1".into(),
        });
    }
    if config.tarpit.max_concurrent == 0 {
        errors.push(ValidationError {
            field: "tarpit.max_concurrent",
            message: "must be at least 1".into(),
        });
    }

    if let Some(dir) = &config.honeypot.payload_dir {
        if !std::path::Path::new(dir).is_dir() {
            errors.push(ValidationError {
                field: "honeypot.payload_dir",
                message: format!("not a directory: {dir:?}"),
            });
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "not a socket address: {:?}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
