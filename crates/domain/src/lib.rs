//! # Salonbook Domain
//!
//! Business domain types and models for Salonbook.
//!
//! This crate contains:
//! - Booking read models (services, staff schedules, appointments)
//! - Terminal payment models (sessions, status records, webhook payloads)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Salonbook crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
