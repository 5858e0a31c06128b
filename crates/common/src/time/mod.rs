//! Time abstraction for testability
//!
//! Services read the current instant through [`Clock`] so tests can pin
//! "now" to a business day and move it forward deterministically.
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use salonbook_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::at(Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap());
//! let start = clock.now();
//! clock.advance(Duration::minutes(5));
//! assert_eq!(clock.now() - start, Duration::minutes(5));
//! ```

mod clock;

pub use clock::{Clock, MockClock, SystemClock};
