//! # Salonbook API
//!
//! HTTP application layer - routes and main entry point.
//!
//! This crate contains:
//! - axum routes (booking UI and payment processor → backend)
//! - Application context (dependency injection)
//! - Logging and health helpers
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod routes;
pub mod utils;

pub use context::*;
pub use routes::router;
