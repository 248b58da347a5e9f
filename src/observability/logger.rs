//! JSON log output
//!
//! The engine only emits `tracing` events. Hosts that want the structured
//! one-object-per-line format install it here:
//!
//! - One log line = one event, fields flattened into the object
//! - Explicit severity (`level`)
//! - Written synchronously to stderr

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Failures while installing the JSON logger
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// The filter directive did not parse
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// Directive as given
        directive: String,
        /// Parser message
        reason: String,
    },

    /// A global subscriber is already installed
    #[error("failed to install logger: {0}")]
    Install(String),
}

/// Install a global JSON subscriber filtered by `directive`
/// (e.g. `"info"` or `"amcache=debug"`).
pub fn install_json_logger(directive: &str) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_new(directive).map_err(|e| ObservabilityError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })?;

    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| ObservabilityError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        let err = install_json_logger("amcache=notalevel").unwrap_err();
        assert!(matches!(err, ObservabilityError::InvalidFilter { .. }));
    }
}
