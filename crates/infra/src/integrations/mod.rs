//! External service integrations

pub mod helcim;

pub use helcim::{HelcimClient, HelcimError};
