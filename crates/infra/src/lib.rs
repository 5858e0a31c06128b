//! # Salonbook Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Configuration loading (environment, TOML/JSON files)
//! - SQLite repositories on an r2d2 pool
//! - The moka-backed terminal session store
//! - HTTP client with retry and the payment processor integration
//!
//! ## Architecture
//! - Implements traits defined in `salonbook-core`
//! - Contains all "impure" code (I/O, network)

pub mod cache;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use cache::MokaSessionStore;
pub use database::*;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::{HelcimClient, HelcimError};
