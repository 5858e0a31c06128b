//! Helcim payment processor integration

pub mod client;
pub mod errors;
pub mod types;

pub use client::HelcimClient;
pub use errors::HelcimError;
