//! HTTP client with retry

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
