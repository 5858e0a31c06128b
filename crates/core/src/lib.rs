//! # Salonbook Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Slot availability computation and booking commits
//! - Terminal payment correlation and status reconciliation
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `salonbook-common` and `salonbook-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod availability;
pub mod payments;

pub use availability::ports::{
    AppointmentRepository, AppointmentWriter, ScheduleRepository, ServiceCatalog,
    StaffEligibility,
};
pub use availability::{
    AvailabilityEngine, BookingPorts, BookingService, BookingSnapshot, BusinessClock, SlotQuery,
};
pub use payments::{
    CorrelationOutcome, InMemoryPaymentStatusCache, InMemorySessionStore, MatchPath,
    PaymentEnricher, PaymentPorts, PaymentStatusCache, TerminalGateway, TerminalPaymentService,
    TerminalSessionStore, WebhookCorrelator,
};
