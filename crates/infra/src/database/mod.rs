//! Database implementations

pub mod appointment_repository;
pub mod catalog_repository;
pub mod manager;
pub mod payment_status_repository;
pub mod schedule_repository;

pub use appointment_repository::SqliteAppointmentStore;
pub use catalog_repository::{SqliteServiceCatalog, SqliteStaffEligibility};
pub use manager::{DbManager, SqliteConnection};
pub use payment_status_repository::SqlitePaymentStatusCache;
pub use schedule_repository::SqliteScheduleRepository;
