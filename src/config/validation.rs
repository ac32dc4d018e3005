//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Smallest accepted `limits.max_line_len`; a join frame must always fit.
pub const MIN_LINE_LEN: usize = 64;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("limits.sendq must be greater than zero")]
    ZeroSendq,
    #[error("limits.mailbox must be greater than zero")]
    ZeroMailbox,
    #[error("limits.max_line_len must be at least {MIN_LINE_LEN}, got {0}")]
    LineLenTooSmall(usize),
    #[error("server.idle_timeouts.{0} must be greater than zero")]
    ZeroIdleTimeout(&'static str),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    // Channel capacities; tokio panics on a zero-sized bounded channel
    if config.limits.sendq == 0 {
        errors.push(ValidationError::ZeroSendq);
    }
    if config.limits.mailbox == 0 {
        errors.push(ValidationError::ZeroMailbox);
    }
    if config.limits.max_line_len < MIN_LINE_LEN {
        errors.push(ValidationError::LineLenTooSmall(config.limits.max_line_len));
    }

    let idle = &config.server.idle_timeouts;
    if idle.ping == 0 {
        errors.push(ValidationError::ZeroIdleTimeout("ping"));
    }
    if idle.timeout == 0 {
        errors.push(ValidationError::ZeroIdleTimeout("timeout"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
