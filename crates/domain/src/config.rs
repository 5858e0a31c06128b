//! Configuration management

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BOOKING_WINDOW_DAYS, DEFAULT_BUSINESS_TIMEZONE, ENRICHMENT_TIMEOUT_MS,
    RECENCY_WINDOW_SECS, SESSION_MAX_AGE_MS,
};
use crate::types::LocationId;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub business: BusinessConfig,
    pub booking: BookingConfig,
    pub terminal: TerminalConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1:8080".to_string() }
    }
}

/// Database configuration
///
/// An empty `path` keeps every store in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    /// Catalog, staff and schedule file loaded into the in-memory stores.
    /// Ignored when `path` is set.
    pub fixtures: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "salonbook.db".to_string(), pool_size: 8, fixtures: None }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path.trim().is_empty()
    }
}

/// Business wall-clock settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessConfig {
    /// IANA timezone name, e.g. `America/Chicago`.
    pub timezone: String,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self { timezone: DEFAULT_BUSINESS_TIMEZONE.to_string() }
    }
}

/// Booking calendar settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub window_days: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self { window_days: DEFAULT_BOOKING_WINDOW_DAYS }
    }
}

/// Card terminal / payment processor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub api_base_url: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub session_max_age_secs: u64,
    pub recency_window_secs: u64,
    pub enrichment_timeout_ms: u64,
    /// Device code of the card terminal installed at each location, keyed by
    /// the location id rendered as a string (TOML keys are always strings).
    pub devices: HashMap<String, String>,
}

impl TerminalConfig {
    pub fn device_for(&self, location_id: LocationId) -> Option<&str> {
        self.devices.get(&location_id.to_string()).map(String::as_str)
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.helcim.com/v2".to_string(),
            api_token: None,
            session_max_age_secs: SESSION_MAX_AGE_MS / 1000,
            recency_window_secs: RECENCY_WINDOW_SECS,
            enrichment_timeout_ms: ENRICHMENT_TIMEOUT_MS,
            devices: HashMap::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
