//! Domain types and models
//!
//! Booking read models are snapshots owned by external collaborators (catalog,
//! staff management, appointment creation). Payment types are owned by the
//! terminal integration.

pub mod appointment;
pub mod booking;
pub mod catalog;
pub mod payment;
pub mod schedule;
pub mod webhook;

pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use booking::{AvailableSlot, BookingRequest, DaySlot, ServiceSelection, StaffSelector};
pub use catalog::Service;
pub use payment::{
    round2, PaymentStatus, PaymentStatusRecord, StartPaymentRequest, TerminalPaymentSession,
    TerminalStartResponse,
};
pub use schedule::StaffSchedule;
pub use webhook::RawWebhookPayload;

pub type StaffId = i64;
pub type ServiceId = i64;
pub type LocationId = i64;
pub type AppointmentId = i64;
pub type ClientId = i64;
pub type CategoryId = i64;
pub type PaymentId = i64;
