//! Shared helpers for the HTTP layer

pub mod health;
pub mod logging;

pub use logging::init_logging;
