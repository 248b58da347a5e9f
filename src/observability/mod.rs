//! Observability for the Amcache engine
//!
//! Logging goes through the `tracing` facade. Every log line carries:
//! - an `event` field with a stable code from [`Event`]
//! - named fields locating the source (`key_path`, `value_name`, `path`, ...)
//!
//! # Usage
//!
//! ```ignore
//! use amcache::observability::{install_json_logger, Event};
//!
//! install_json_logger("info")?;
//! tracing::info!(event = Event::ScanBegin.as_str(), path = %path.display(), "scanning");
//! ```

#[cfg(any(test, feature = "test-util"))]
pub mod capture;
mod events;
mod logger;

pub use events::Event;
pub use logger::{install_json_logger, ObservabilityError};

/// Appended to every record-build failure so malformed keys get reported
pub const REPORT_HINT: &str =
    "Please report this key to the amcache maintainers on the project issue tracker, including the key data below";
