//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Booking grid
pub const DAY_GRID_FIRST_HOUR: u32 = 8;
pub const DAY_GRID_LAST_HOUR: u32 = 21;
pub const SLOT_STEP_MINUTES: u32 = 30;

/// Duration assumed when a service cannot be resolved or resolves to <= 0.
pub const FALLBACK_SERVICE_MINUTES: i64 = 60;

/// Calendar look-ahead used by the date picker.
pub const DEFAULT_BOOKING_WINDOW_DAYS: u32 = 30;

/// Wall-clock timezone every instant is normalized into.
pub const DEFAULT_BUSINESS_TIMEZONE: &str = "America/Chicago";

// Terminal payments
pub const SESSION_MAX_AGE_MS: u64 = 3_600_000;
pub const RECENCY_WINDOW_SECS: u64 = 300;
pub const ENRICHMENT_TIMEOUT_MS: u64 = 2_500;
pub const INVOICE_PREFIX: &str = "INV";
