//! Booking availability
//!
//! Pure slot computation over fetched snapshots ([`AvailabilityEngine`]) plus
//! the [`BookingService`] facade that fetches those snapshots through ports
//! and commits bookings.

pub mod appointment_index;
pub mod duration;
pub mod engine;
pub mod memory;
pub mod ports;
pub mod schedule_index;
pub mod service;
pub mod slots;
pub mod staff_resolver;
pub mod wall_clock;

use chrono::{NaiveTime, Timelike};

pub use appointment_index::{AppointmentIndex, BookedInterval};
pub use duration::DurationResolver;
pub use engine::{AvailabilityEngine, BookingSnapshot, SlotQuery};
pub use schedule_index::{MinuteWindow, ScheduleIndex};
pub use service::{BookingPorts, BookingService};
pub use slots::SlotGenerator;
pub use staff_resolver::StaffResolver;
pub use wall_clock::BusinessClock;

pub(crate) fn minute_of(time: NaiveTime) -> i64 {
    i64::from(time.hour() * 60 + time.minute())
}
