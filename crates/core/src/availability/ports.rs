//! Port interfaces for booking availability
//!
//! Read models are owned by external collaborators (catalog, staff
//! management, appointment creation). Every query fetches fresh data through
//! these ports; nothing here is cached between calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use salonbook_domain::{
    Appointment, LocationId, NewAppointment, Result, Service, ServiceId, StaffId, StaffSchedule,
};

/// Trait for reading the service catalog
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Services bookable at a location, including add-ons.
    async fn services_for_location(&self, location_id: LocationId) -> Result<Vec<Service>>;
}

/// Trait for the staff to service assignment mapping
#[async_trait]
pub trait StaffEligibility: Send + Sync {
    /// Staff assigned to perform `service_id` at `location_id`, any order.
    async fn staff_for_service(
        &self,
        service_id: ServiceId,
        location_id: LocationId,
    ) -> Result<Vec<StaffId>>;
}

/// Trait for reading staff schedules
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Rows that apply to `location_id`, including location-less rows.
    async fn schedules_for_location(&self, location_id: LocationId) -> Result<Vec<StaffSchedule>>;
}

/// Trait for reading existing appointments
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Appointments of every location starting in `[from, to)`.
    async fn appointments_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;
}

/// Trait for the appointment-creation collaborator
#[async_trait]
pub trait AppointmentWriter: Send + Sync {
    async fn create_appointment(&self, appointment: NewAppointment) -> Result<Appointment>;
}
