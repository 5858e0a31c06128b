//! In-memory implementations of the booking ports
//!
//! Used by tests and by deployments that run without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use salonbook_domain::{
    Appointment, LocationId, NewAppointment, Result, Service, ServiceId, StaffId, StaffSchedule,
};
use tokio::sync::RwLock;

use super::ports::{
    AppointmentRepository, AppointmentWriter, ScheduleRepository, ServiceCatalog,
    StaffEligibility,
};

/// Catalog shared by every location.
#[derive(Debug, Default)]
pub struct InMemoryServiceCatalog {
    services: RwLock<Vec<Service>>,
}

impl InMemoryServiceCatalog {
    pub fn new(services: Vec<Service>) -> Self {
        Self { services: RwLock::new(services) }
    }

    pub async fn upsert(&self, service: Service) {
        let mut services = self.services.write().await;
        services.retain(|existing| existing.id != service.id);
        services.push(service);
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryServiceCatalog {
    async fn services_for_location(&self, _location_id: LocationId) -> Result<Vec<Service>> {
        Ok(self.services.read().await.clone())
    }
}

/// Staff to service assignments, valid at every location.
#[derive(Debug, Default)]
pub struct InMemoryStaffEligibility {
    assignments: RwLock<HashMap<ServiceId, Vec<StaffId>>>,
}

impl InMemoryStaffEligibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from `(service, staff)` pairs; duplicates collapse.
    pub fn with_assignments(pairs: impl IntoIterator<Item = (ServiceId, StaffId)>) -> Self {
        let mut assignments: HashMap<ServiceId, Vec<StaffId>> = HashMap::new();
        for (service_id, staff_id) in pairs {
            let staff = assignments.entry(service_id).or_default();
            if !staff.contains(&staff_id) {
                staff.push(staff_id);
            }
        }
        Self { assignments: RwLock::new(assignments) }
    }

    pub async fn assign(&self, service_id: ServiceId, staff_id: StaffId) {
        let mut assignments = self.assignments.write().await;
        let staff = assignments.entry(service_id).or_default();
        if !staff.contains(&staff_id) {
            staff.push(staff_id);
        }
    }
}

#[async_trait]
impl StaffEligibility for InMemoryStaffEligibility {
    async fn staff_for_service(
        &self,
        service_id: ServiceId,
        _location_id: LocationId,
    ) -> Result<Vec<StaffId>> {
        Ok(self.assignments.read().await.get(&service_id).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryScheduleRepository {
    schedules: RwLock<Vec<StaffSchedule>>,
}

impl InMemoryScheduleRepository {
    pub fn new(schedules: Vec<StaffSchedule>) -> Self {
        Self { schedules: RwLock::new(schedules) }
    }

    pub async fn add(&self, schedule: StaffSchedule) {
        self.schedules.write().await.push(schedule);
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn schedules_for_location(&self, location_id: LocationId) -> Result<Vec<StaffSchedule>> {
        Ok(self
            .schedules
            .read()
            .await
            .iter()
            .filter(|row| row.location_id.map_or(true, |loc| loc == location_id))
            .cloned()
            .collect())
    }
}

/// Appointment book backing both the read and the create port.
#[derive(Debug)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
    next_id: AtomicI64,
}

impl InMemoryAppointmentStore {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        let next_id = appointments.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        Self { appointments: RwLock::new(appointments), next_id: AtomicI64::new(next_id) }
    }

    pub async fn all(&self) -> Vec<Appointment> {
        self.appointments.read().await.clone()
    }
}

impl Default for InMemoryAppointmentStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentStore {
    async fn appointments_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        Ok(self
            .appointments
            .read()
            .await
            .iter()
            .filter(|a| a.start_time >= from && a.start_time < to)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AppointmentWriter for InMemoryAppointmentStore {
    async fn create_appointment(&self, appointment: NewAppointment) -> Result<Appointment> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = appointment.into_appointment(id);
        self.appointments.write().await.push(created.clone());
        Ok(created)
    }
}
