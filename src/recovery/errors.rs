//! Recovery error types
//!
//! Error codes:
//! - AMCACHE_DIRTY_STORE_NO_LOGS (FATAL)
//! - AMCACHE_INVALID_STORE_HEADER (FATAL)
//! - AMCACHE_LOG_DISCOVERY_FAILED (FATAL)
//! - AMCACHE_LOG_PAGE_OUT_OF_BOUNDS (FATAL)
//! - AMCACHE_LOG_UNREADABLE (RECOVERABLE)
//! - AMCACHE_LOG_INVALID_BASE_BLOCK (RECOVERABLE)
//! - AMCACHE_LOG_UNSUPPORTED_FORMAT (RECOVERABLE)
//! - AMCACHE_LOG_INVALID_ENTRY (RECOVERABLE)
//!
//! A recoverable error costs one transaction log; replay continues with the
//! next one. A fatal error ends the run with no output.

use std::fmt;

/// Severity levels for recovery errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Skip the offending log and continue
    Recoverable,
    /// Abort the run
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Recoverable => write!(f, "RECOVERABLE"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Recovery error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryErrorCode {
    /// Store is dirty, replay is required and no logs exist
    DirtyStoreNoLogs,
    /// Store base block cannot be parsed
    InvalidStoreHeader,
    /// Store directory could not be listed
    LogDiscoveryFailed,
    /// A dirty page lies outside the hive image
    LogPageOutOfBounds,
    /// A log file could not be read
    LogUnreadable,
    /// A log's base block is missing or corrupt
    LogInvalidBaseBlock,
    /// Old-format (pre Windows 8.1) log
    LogUnsupportedFormat,
    /// An entry declares an implausible hive bins size
    LogInvalidEntry,
}

impl RecoveryErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            RecoveryErrorCode::DirtyStoreNoLogs => "AMCACHE_DIRTY_STORE_NO_LOGS",
            RecoveryErrorCode::InvalidStoreHeader => "AMCACHE_INVALID_STORE_HEADER",
            RecoveryErrorCode::LogDiscoveryFailed => "AMCACHE_LOG_DISCOVERY_FAILED",
            RecoveryErrorCode::LogPageOutOfBounds => "AMCACHE_LOG_PAGE_OUT_OF_BOUNDS",
            RecoveryErrorCode::LogUnreadable => "AMCACHE_LOG_UNREADABLE",
            RecoveryErrorCode::LogInvalidBaseBlock => "AMCACHE_LOG_INVALID_BASE_BLOCK",
            RecoveryErrorCode::LogUnsupportedFormat => "AMCACHE_LOG_UNSUPPORTED_FORMAT",
            RecoveryErrorCode::LogInvalidEntry => "AMCACHE_LOG_INVALID_ENTRY",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RecoveryErrorCode::DirtyStoreNoLogs
            | RecoveryErrorCode::InvalidStoreHeader
            | RecoveryErrorCode::LogDiscoveryFailed
            | RecoveryErrorCode::LogPageOutOfBounds => Severity::Fatal,
            RecoveryErrorCode::LogUnreadable
            | RecoveryErrorCode::LogInvalidBaseBlock
            | RecoveryErrorCode::LogUnsupportedFormat
            | RecoveryErrorCode::LogInvalidEntry => Severity::Recoverable,
        }
    }
}

impl fmt::Display for RecoveryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Recovery error with context
#[derive(Debug, Clone)]
pub struct RecoveryError {
    code: RecoveryErrorCode,
    message: String,
    /// Log file the error concerns
    log: Option<String>,
    /// Byte offset within the log
    offset: Option<u64>,
    /// Log entry sequence number
    sequence: Option<u32>,
}

impl RecoveryError {
    fn new(code: RecoveryErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            log: None,
            offset: None,
            sequence: None,
        }
    }

    pub fn dirty_store_no_logs(store: impl fmt::Display) -> Self {
        Self::new(
            RecoveryErrorCode::DirtyStoreNoLogs,
            format!(
                "{} is dirty and no transaction logs were found; replay them or skip replay explicitly",
                store
            ),
        )
    }

    pub fn invalid_store_header(reason: impl Into<String>) -> Self {
        Self::new(RecoveryErrorCode::InvalidStoreHeader, reason.into())
    }

    pub fn log_discovery_failed(dir: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::new(
            RecoveryErrorCode::LogDiscoveryFailed,
            format!("cannot list transaction logs next to {}: {}", dir, reason),
        )
    }

    pub fn log_unreadable(log: impl Into<String>, reason: impl fmt::Display) -> Self {
        let log = log.into();
        let mut err = Self::new(
            RecoveryErrorCode::LogUnreadable,
            format!("cannot read {}: {}", log, reason),
        );
        err.log = Some(log);
        err
    }

    pub fn invalid_log_base_block(log: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut err = Self::new(RecoveryErrorCode::LogInvalidBaseBlock, reason.into());
        err.log = Some(log.into());
        err.offset = Some(0);
        err
    }

    pub fn unsupported_log_format(log: impl Into<String>) -> Self {
        let mut err = Self::new(
            RecoveryErrorCode::LogUnsupportedFormat,
            "old-format transaction log is not supported".to_string(),
        );
        err.log = Some(log.into());
        err
    }

    pub fn invalid_log_entry(
        log: impl Into<String>,
        offset: u64,
        sequence: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            code: RecoveryErrorCode::LogInvalidEntry,
            message: reason.into(),
            log: Some(log.into()),
            offset: Some(offset),
            sequence: Some(sequence),
        }
    }

    pub fn page_out_of_bounds(
        log: impl Into<String>,
        offset: u64,
        sequence: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            code: RecoveryErrorCode::LogPageOutOfBounds,
            message: reason.into(),
            log: Some(log.into()),
            offset: Some(offset),
            sequence: Some(sequence),
        }
    }

    pub fn code(&self) -> RecoveryErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn log(&self) -> Option<&str> {
        self.log.as_deref()
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn sequence(&self) -> Option<u32> {
        self.sequence
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for RecoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(log) = &self.log {
            write!(f, " [log {}", log)?;
            if let Some(offset) = self.offset {
                write!(f, " at offset {}", offset)?;
            }
            if let Some(sequence) = self.sequence {
                write!(f, ", sequence {}", sequence)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl std::error::Error for RecoveryError {}

/// Result type for recovery operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_per_code() {
        let fatal = [
            RecoveryErrorCode::DirtyStoreNoLogs,
            RecoveryErrorCode::InvalidStoreHeader,
            RecoveryErrorCode::LogDiscoveryFailed,
            RecoveryErrorCode::LogPageOutOfBounds,
        ];
        for code in fatal {
            assert_eq!(code.severity(), Severity::Fatal);
        }

        let recoverable = [
            RecoveryErrorCode::LogUnreadable,
            RecoveryErrorCode::LogInvalidBaseBlock,
            RecoveryErrorCode::LogUnsupportedFormat,
            RecoveryErrorCode::LogInvalidEntry,
        ];
        for code in recoverable {
            assert_eq!(code.severity(), Severity::Recoverable);
        }
    }

    #[test]
    fn test_error_display_carries_context() {
        let err = RecoveryError::page_out_of_bounds("Amcache.hve.LOG1", 1024, 7, "page past end");
        let display = err.to_string();
        assert!(display.contains("FATAL"));
        assert!(display.contains("AMCACHE_LOG_PAGE_OUT_OF_BOUNDS"));
        assert!(display.contains("Amcache.hve.LOG1"));
        assert!(display.contains("offset 1024"));
        assert!(display.contains("sequence 7"));
    }

    #[test]
    fn test_unsupported_format_is_recoverable() {
        let err = RecoveryError::unsupported_log_format("Amcache.hve.LOG");
        assert!(!err.is_fatal());
        assert_eq!(err.log(), Some("Amcache.hve.LOG"));
    }

    #[test]
    fn test_no_logs_is_fatal() {
        let err = RecoveryError::dirty_store_no_logs("Amcache.hve");
        assert!(err.is_fatal());
        assert_eq!(err.code().code(), "AMCACHE_DIRTY_STORE_NO_LOGS");
    }
}
