//! Shared test helpers for `salonbook-core` integration tests.
//!
//! Fixtures build a small salon: one location, a handful of services and
//! stylists working Monday 09:00-17:00 from the start of 2025.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use salonbook_common::time::MockClock;
use salonbook_core::availability::memory::{
    InMemoryAppointmentStore, InMemoryScheduleRepository, InMemoryServiceCatalog,
    InMemoryStaffEligibility,
};
use salonbook_core::{BookingPorts, BookingService, BusinessClock};
use salonbook_domain::{
    BookingRequest, LocationId, Service, ServiceId, StaffId, StaffSchedule, StaffSelector,
};

pub const LOCATION: LocationId = 1;
pub const HAIRCUT: ServiceId = 1;
pub const COLOR: ServiceId = 2;
pub const GLOSS: ServiceId = 3;

/// 2025-03-03 is a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

/// Saturday noon before [`monday`], in UTC.
pub fn saturday_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}

pub fn service(id: ServiceId, duration: i32) -> Service {
    Service {
        id,
        name: format!("service-{id}"),
        duration,
        buffer_time_before: 0,
        buffer_time_after: 0,
        price: 40.0,
        category_id: None,
        is_add_on: false,
        base_service_ids: Vec::new(),
    }
}

pub fn add_on(id: ServiceId, duration: i32, base: ServiceId) -> Service {
    Service { is_add_on: true, base_service_ids: vec![base], ..service(id, duration) }
}

pub fn catalog() -> Vec<Service> {
    vec![service(HAIRCUT, 60), service(COLOR, 90), add_on(GLOSS, 15, COLOR)]
}

pub fn monday_shift(staff_id: StaffId, location_id: LocationId) -> StaffSchedule {
    StaffSchedule {
        id: staff_id * 10 + location_id,
        staff_id,
        location_id: Some(location_id),
        day_of_week: "Monday".into(),
        start_time: "09:00".into(),
        end_time: "17:00".into(),
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: None,
        is_blocked: false,
    }
}

pub struct Salon {
    pub service: Arc<BookingService>,
    pub appointments: Arc<InMemoryAppointmentStore>,
    pub clock: MockClock,
}

/// Every listed stylist performs every catalog service and works Monday at
/// [`LOCATION`].
pub async fn salon(staff: &[StaffId]) -> Salon {
    let eligibility = Arc::new(InMemoryStaffEligibility::new());
    for staff_id in staff {
        for service in catalog() {
            eligibility.assign(service.id, *staff_id).await;
        }
    }
    let schedules = staff.iter().map(|staff_id| monday_shift(*staff_id, LOCATION)).collect();
    let appointments = Arc::new(InMemoryAppointmentStore::default());
    let ports = BookingPorts {
        catalog: Arc::new(InMemoryServiceCatalog::new(catalog())),
        eligibility,
        schedules: Arc::new(InMemoryScheduleRepository::new(schedules)),
        appointments: appointments.clone(),
        writer: appointments.clone(),
    };

    let clock = MockClock::at(saturday_noon());
    let service = BookingService::new(ports, BusinessClock::default())
        .with_time_source(Arc::new(clock.clone()));
    Salon { service: Arc::new(service), appointments, clock }
}

pub fn booking(staff: StaffSelector, service_id: ServiceId, time: &str) -> BookingRequest {
    BookingRequest {
        staff,
        service_id: Some(service_id),
        add_on_ids: Vec::new(),
        location_id: Some(LOCATION),
        date: Some(monday()),
        time: Some(time.into()),
        client_id: Some(77),
        notes: None,
    }
}
