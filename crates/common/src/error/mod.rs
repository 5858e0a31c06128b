//! Common error types and classification
//!
//! Failures that any remote adapter can hit (timeouts, backend errors,
//! unreadable payloads) are modelled once here. Adapter-specific errors
//! compose `CommonError` and implement [`ErrorClassification`] so retry and
//! logging decisions stay uniform:
//!
//! ```rust,ignore
//! #[derive(Debug, thiserror::Error)]
//! pub enum GatewayError {
//!     #[error("device {0} is offline")]
//!     DeviceOffline(String),
//!
//!     #[error(transparent)]
//!     Common(#[from] CommonError),
//! }
//! ```
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case |
//! |-------|----------|
//! | **Info** | Expected conditions such as a missing record |
//! | **Warning** | Degraded but operational, usually transient |
//! | **Error** | Failure requiring attention |
//! | **Critical** | Invariant violations |

use std::fmt;
use std::time::Duration;

/// Error variants shared by remote adapters.
#[derive(Debug, Clone, PartialEq)]
pub enum CommonError {
    /// Serialization or deserialization errors
    Serialization { message: String, format: Option<String> },

    /// Operation exceeded its deadline
    Timeout { operation: String, duration: Duration },

    /// Remote service failures
    Backend { service: String, message: String, is_retryable: bool },
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialization { message, format } => match format {
                Some(format) => write!(f, "Serialization error ({}): {}", format, message),
                None => write!(f, "Serialization error: {}", message),
            },
            Self::Timeout { operation, duration } => {
                write!(f, "Operation '{}' timed out after {:?}", operation, duration)
            }
            Self::Backend { service, message, .. } => {
                write!(f, "Backend error from '{}': {}", service, message)
            }
        }
    }
}

impl std::error::Error for CommonError {}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Backend { is_retryable, .. } => *is_retryable,
            Self::Serialization { .. } => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Serialization { .. } => ErrorSeverity::Error,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::Backend { is_retryable: true, .. } => ErrorSeverity::Warning,
            Self::Backend { .. } => ErrorSeverity::Error,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl CommonError {
    /// Create a serialization error with format information
    pub fn serialization_format<S: Into<String>, F: Into<String>>(format: F, message: S) -> Self {
        Self::Serialization { message: message.into(), format: Some(format.into()) }
    }

    pub fn timeout<S: Into<String>>(operation: S, duration: Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration }
    }

    pub fn backend<S: Into<String>, M: Into<String>>(
        service: S,
        message: M,
        is_retryable: bool,
    ) -> Self {
        Self::Backend { service: service.into(), message: message.into(), is_retryable }
    }
}

/// Error classification trait for consistent error handling across crates
///
/// Retry loops and log-level decisions key off this trait instead of
/// matching on concrete error enums.
pub trait ErrorClassification {
    /// Transient failures that may succeed if attempted again.
    fn is_retryable(&self) -> bool;

    /// Severity used for logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Invariant violations that need immediate attention.
    fn is_critical(&self) -> bool;

    /// Suggested retry delay, e.g. from a `Retry-After` header.
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
