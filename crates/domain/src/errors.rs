//! Error types used throughout the application

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Salonbook
///
/// "No working schedule" is deliberately absent: a staff member without
/// working windows simply has no availability and surfaces as an empty result.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SalonError {
    /// Bad caller input (missing service, date, or time at commit).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The slot was free when browsed but is taken at commit time.
    #[error("Slot no longer available: {date} {time}")]
    SlotNoLongerAvailable { date: NaiveDate, time: NaiveTime },

    /// A webhook could not be matched to any terminal session.
    #[error("Correlation ambiguous: {0}")]
    CorrelationAmbiguous(String),

    /// Best-effort lookup against the payment processor failed or timed out.
    #[error("Enrichment unavailable: {0}")]
    EnrichmentUnavailable(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SalonError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Network(_) | Self::EnrichmentUnavailable(_))
    }

    /// Copy shown to end users for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "please check the booking details and try again",
            Self::SlotNoLongerAvailable { .. } => {
                "that time was just taken, please choose another"
            }
            Self::NotFound(_) => "not found",
            Self::CorrelationAmbiguous(_) | Self::EnrichmentUnavailable(_) => "processing",
            Self::Persistence(_) | Self::Network(_) => "unable to load availability, try again",
            Self::Config(_) | Self::Internal(_) => "something went wrong, please contact support",
        }
    }

    /// Stable label suitable for logging fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::SlotNoLongerAvailable { .. } => "slot_no_longer_available",
            Self::CorrelationAmbiguous(_) => "correlation_ambiguous",
            Self::EnrichmentUnavailable(_) => "enrichment_unavailable",
            Self::Persistence(_) => "persistence",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Salonbook operations
pub type Result<T> = std::result::Result<T, SalonError>;
