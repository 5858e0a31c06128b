//! Payment processor error classification

use std::time::Duration;

use reqwest::StatusCode;
use salonbook_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use salonbook_domain::SalonError;
use thiserror::Error;

const SERVICE: &str = "helcim";

#[derive(Debug, Error)]
pub enum HelcimError {
    #[error("payment processor API token is not configured")]
    MissingToken,

    #[error("payment processor rejected the credentials (HTTP {0})")]
    Unauthorized(u16),

    #[error("payment processor has no record of '{0}'")]
    UnknownTransaction(String),

    #[error("payment processor rejected the request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl HelcimError {
    /// Classify a non-success response.
    pub fn from_response(status: StatusCode, body: String, subject: &str) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Unauthorized(status.as_u16()),
            404 => Self::UnknownTransaction(subject.to_string()),
            429 | 500..=599 => Self::Common(CommonError::backend(
                SERVICE,
                format!("HTTP {}: {body}", status.as_u16()),
                true,
            )),
            code => Self::Rejected { status: code, body },
        }
    }

    pub fn timeout(operation: &str, after: Duration) -> Self {
        Self::Common(CommonError::timeout(operation, after))
    }

    /// Enrichment is best effort; every failure is "unavailable".
    pub fn into_enrichment_error(self) -> SalonError {
        SalonError::EnrichmentUnavailable(self.to_string())
    }

    /// Terminal start failures surface to the caller.
    pub fn into_domain_error(self) -> SalonError {
        match self {
            Self::MissingToken | Self::Unauthorized(_) => SalonError::Config(self.to_string()),
            Self::UnknownTransaction(subject) => SalonError::NotFound(subject),
            Self::Rejected { .. } => SalonError::Validation(self.to_string()),
            Self::Common(err) if err.is_retryable() => SalonError::Network(err.to_string()),
            Self::Common(CommonError::Serialization { message, .. }) => {
                SalonError::Network(format!("unreadable processor response: {message}"))
            }
            Self::Common(err) => SalonError::Internal(err.to_string()),
        }
    }
}

impl ErrorClassification for HelcimError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Common(err) => err.is_retryable(),
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingToken | Self::Unauthorized(_) => ErrorSeverity::Critical,
            Self::UnknownTransaction(_) => ErrorSeverity::Info,
            Self::Rejected { .. } => ErrorSeverity::Error,
            Self::Common(err) => err.severity(),
        }
    }

    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    fn retry_after(&self) -> Option<Duration> {
        self.is_retryable().then_some(Duration::from_secs(5))
    }
}
