//! Appointment read model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AppointmentId, ClientId, LocationId, ServiceId, StaffId};
use crate::impl_domain_status_conversions;

/// Lifecycle status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Completed,
    NoShow,
    #[serde(alias = "canceled")]
    Cancelled,
}

impl_domain_status_conversions!(AppointmentStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    CheckedIn => "checked_in",
    Completed => "completed",
    NoShow => "no_show",
    Cancelled => "cancelled",
});

impl AppointmentStatus {
    /// Every status except `cancelled` occupies the staff member's time,
    /// including `completed`.
    pub fn blocks_time(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// An existing booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub staff_id: StaffId,
    #[serde(default)]
    pub client_id: Option<ClientId>,
    pub service_id: ServiceId,
    #[serde(default)]
    pub add_on_ids: Vec<ServiceId>,
    pub start_time: DateTime<Utc>,
    /// Missing or non-positive spans are inferred from the service duration.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Appointment handed to the appointment-creation collaborator at commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub staff_id: StaffId,
    pub client_id: Option<ClientId>,
    pub service_id: ServiceId,
    pub add_on_ids: Vec<ServiceId>,
    pub location_id: LocationId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl NewAppointment {
    /// Materialise the stored appointment once the writer assigned an id.
    pub fn into_appointment(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            staff_id: self.staff_id,
            client_id: self.client_id,
            service_id: self.service_id,
            add_on_ids: self.add_on_ids,
            start_time: self.start_time,
            end_time: Some(self.end_time),
            status: self.status,
            location_id: Some(self.location_id),
            notes: self.notes,
        }
    }
}
