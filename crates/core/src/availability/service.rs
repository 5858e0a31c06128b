//! Booking service - availability queries and commit

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, Utc};
use dashmap::DashMap;
use salonbook_common::time::{Clock, SystemClock};
use salonbook_domain::constants::DEFAULT_BOOKING_WINDOW_DAYS;
use salonbook_domain::{
    Appointment, AppointmentStatus, AvailableSlot, BookingRequest, LocationId, NewAppointment,
    Result, SalonError, Service, ServiceId, ServiceSelection, StaffId,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::engine::{AvailabilityEngine, BookingSnapshot, SlotQuery};
use super::ports::{
    AppointmentRepository, AppointmentWriter, ScheduleRepository, ServiceCatalog,
    StaffEligibility,
};
use super::staff_resolver::StaffResolver;
use super::wall_clock::BusinessClock;

/// Collaborators the booking service reads from and writes to.
#[derive(Clone)]
pub struct BookingPorts {
    pub catalog: Arc<dyn ServiceCatalog>,
    pub eligibility: Arc<dyn StaffEligibility>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub writer: Arc<dyn AppointmentWriter>,
}

/// Read/commit facade over the availability engine.
///
/// Every call re-fetches its snapshot. Commits for the same business date are
/// serialised in-process so concurrent attempts on one slot cannot both pass
/// the re-validation.
pub struct BookingService {
    ports: BookingPorts,
    clock: BusinessClock,
    time_source: Arc<dyn Clock>,
    window_days: u32,
    commit_locks: DashMap<NaiveDate, Arc<Mutex<()>>>,
}

impl BookingService {
    pub fn new(ports: BookingPorts, clock: BusinessClock) -> Self {
        Self {
            ports,
            clock,
            time_source: Arc::new(SystemClock),
            window_days: DEFAULT_BOOKING_WINDOW_DAYS,
            commit_locks: DashMap::new(),
        }
    }

    pub fn with_time_source(mut self, time_source: Arc<dyn Clock>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }

    /// Past dates can no longer be committed, so their locks are dropped.
    fn prune_commit_locks(&self) {
        let today = self.clock.local_date(self.time_source.now());
        self.commit_locks.retain(|date, _| *date >= today);
    }

    pub fn business_clock(&self) -> &BusinessClock {
        &self.clock
    }

    /// Staff assigned to the service who also work at the location, ascending.
    pub async fn eligible_staff(
        &self,
        service_id: ServiceId,
        location_id: LocationId,
    ) -> Result<Vec<StaffId>> {
        let schedules = self.ports.schedules.schedules_for_location(location_id).await?;
        let engine = AvailabilityEngine::new(
            self.clock,
            &BookingSnapshot { schedules, ..BookingSnapshot::default() },
        );
        self.eligible_from(&engine, service_id, location_id).await
    }

    async fn eligible_from(
        &self,
        engine: &AvailabilityEngine,
        service_id: ServiceId,
        location_id: LocationId,
    ) -> Result<Vec<StaffId>> {
        let assigned: BTreeSet<StaffId> = self
            .ports
            .eligibility
            .staff_for_service(service_id, location_id)
            .await?
            .into_iter()
            .collect();
        let scheduled = engine.schedules().staff_with_schedule_at(location_id);
        Ok(assigned.intersection(&scheduled).copied().collect())
    }

    /// Bookable slots for one business date.
    pub async fn available_slots(
        &self,
        query: &SlotQuery,
        date: NaiveDate,
    ) -> Result<Vec<AvailableSlot>> {
        let engine = self.load_engine(query.location_id, date, date).await?;
        let eligible = self.eligible_from(&engine, query.selection.service_id, query.location_id).await?;
        let candidates = StaffResolver::candidates(query.staff, &eligible);

        let slots = engine.available_slots_for(query, &candidates, date, self.time_source.now());
        debug!(
            location_id = query.location_id,
            service_id = query.selection.service_id,
            staff = %query.staff,
            %date,
            slots = slots.len(),
            "computed available slots"
        );
        Ok(slots)
    }

    /// Days in `[start, start + window_days]` with at least one slot.
    pub async fn available_dates(&self, query: &SlotQuery, start: NaiveDate) -> Result<Vec<NaiveDate>> {
        let end = start
            .checked_add_days(Days::new(u64::from(self.window_days)))
            .ok_or_else(|| SalonError::Validation(format!("date window overflows from {start}")))?;
        let engine = self.load_engine(query.location_id, start, end).await?;
        let eligible = self.eligible_from(&engine, query.selection.service_id, query.location_id).await?;
        let candidates = StaffResolver::candidates(query.staff, &eligible);

        Ok(engine.available_dates_in_range(
            query,
            &candidates,
            start,
            self.window_days,
            self.time_source.now(),
        ))
    }

    /// Re-validate against a fresh snapshot and create the appointment.
    pub async fn commit_booking(&self, request: BookingRequest) -> Result<Appointment> {
        let service_id = request
            .service_id
            .ok_or_else(|| SalonError::Validation("service_id is required".into()))?;
        let location_id = request
            .location_id
            .ok_or_else(|| SalonError::Validation("location_id is required".into()))?;
        let date = request.date.ok_or_else(|| SalonError::Validation("date is required".into()))?;
        let raw_time = request
            .time
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SalonError::Validation("time is required".into()))?;
        let start = NaiveTime::parse_from_str(raw_time, "%H:%M").map_err(|_| {
            SalonError::Validation(format!("time must be HH:MM, got '{raw_time}'"))
        })?;
        let selection = ServiceSelection::with_add_ons(service_id, request.add_on_ids.clone());

        let start_min = super::minute_of(start);
        let start_instant = self.clock.to_instant(date, start_min);
        if start_instant <= self.time_source.now() {
            return Err(SalonError::SlotNoLongerAvailable { date, time: start });
        }

        self.prune_commit_locks();
        let lock = Arc::clone(&self.commit_locks.entry(date).or_default());
        let _guard = lock.lock().await;

        let engine = self.load_engine(location_id, date, date).await?;
        validate_selection(&engine, &selection)?;

        let eligible = self.eligible_from(&engine, service_id, location_id).await?;
        let staff_id = match StaffResolver::new(&engine).resolve(
            request.staff,
            &eligible,
            location_id,
            date,
            start,
            &selection,
        ) {
            Ok(staff_id) => staff_id,
            Err(err) => {
                warn!(
                    staff = %request.staff,
                    service_id,
                    location_id,
                    %date,
                    time = %start,
                    "booking lost the race for its slot"
                );
                return Err(err);
            }
        };

        let minutes = engine.durations().resolve_selection(&selection);
        let appointment = self
            .ports
            .writer
            .create_appointment(NewAppointment {
                staff_id,
                client_id: request.client_id,
                service_id,
                add_on_ids: selection.add_on_ids,
                location_id,
                start_time: start_instant,
                end_time: start_instant + Duration::minutes(minutes),
                status: AppointmentStatus::Confirmed,
                notes: request.notes,
            })
            .await?;

        info!(
            appointment_id = appointment.id,
            staff_id,
            service_id,
            location_id,
            %date,
            time = %start,
            "booking committed"
        );
        Ok(appointment)
    }

    async fn load_engine(
        &self,
        location_id: LocationId,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<AvailabilityEngine> {
        let (from, to) = self.instant_range(first, last)?;

        let services = self.ports.catalog.services_for_location(location_id).await?;
        let schedules = self.ports.schedules.schedules_for_location(location_id).await?;
        let appointments = self.ports.appointments.appointments_between(from, to).await?;

        Ok(AvailabilityEngine::new(
            self.clock,
            &BookingSnapshot { services, schedules, appointments },
        ))
    }

    /// UTC bounds covering the business dates `first..=last`.
    fn instant_range(
        &self,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let after_last = last
            .checked_add_days(Days::new(1))
            .ok_or_else(|| SalonError::Validation(format!("date out of range: {last}")))?;
        Ok((self.clock.to_instant(first, 0), self.clock.to_instant(after_last, 0)))
    }
}

/// The base service must exist and every add-on must attach to it.
fn validate_selection(engine: &AvailabilityEngine, selection: &ServiceSelection) -> Result<()> {
    let durations = engine.durations();
    let base = durations
        .lookup(selection.service_id)
        .ok_or_else(|| SalonError::Validation(format!("unknown service {}", selection.service_id)))?;

    let add_ons: HashMap<ServiceId, &Service> = selection
        .add_on_ids
        .iter()
        .map(|id| {
            durations
                .lookup(*id)
                .map(|service| (*id, service))
                .ok_or_else(|| SalonError::Validation(format!("unknown add-on {id}")))
        })
        .collect::<Result<_>>()?;

    if let Some((id, _)) = add_ons.iter().find(|(_, add_on)| !add_on.attaches_to(base.id)) {
        return Err(SalonError::Validation(format!(
            "service {id} cannot be added to service {}",
            base.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use salonbook_common::time::MockClock;
    use salonbook_domain::{StaffSchedule, StaffSelector};

    use super::*;
    use crate::availability::memory::{
        InMemoryAppointmentStore, InMemoryScheduleRepository, InMemoryServiceCatalog,
        InMemoryStaffEligibility,
    };

    fn service(id: ServiceId, duration: i32, is_add_on: bool, base: Vec<ServiceId>) -> Service {
        Service {
            id,
            name: format!("service-{id}"),
            duration,
            buffer_time_before: 0,
            buffer_time_after: 0,
            price: 30.0,
            category_id: None,
            is_add_on,
            base_service_ids: base,
        }
    }

    async fn booking_service() -> (BookingService, Arc<InMemoryAppointmentStore>) {
        let catalog = Arc::new(InMemoryServiceCatalog::new(vec![
            service(1, 60, false, Vec::new()),
            service(2, 15, true, vec![1]),
            service(3, 15, true, vec![99]),
        ]));
        let eligibility = Arc::new(InMemoryStaffEligibility::new());
        eligibility.assign(1, 4).await;
        let schedules = Arc::new(InMemoryScheduleRepository::new(vec![StaffSchedule {
            id: 1,
            staff_id: 4,
            location_id: Some(1),
            day_of_week: "Monday".into(),
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            is_blocked: false,
        }]));
        let appointments = Arc::new(InMemoryAppointmentStore::default());
        let ports = BookingPorts {
            catalog,
            eligibility,
            schedules,
            appointments: appointments.clone(),
            writer: appointments.clone(),
        };
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let service = BookingService::new(ports, BusinessClock::default())
            .with_time_source(Arc::new(MockClock::at(now)));
        (service, appointments)
    }

    fn request(time: &str, add_ons: Vec<ServiceId>) -> BookingRequest {
        BookingRequest {
            staff: StaffSelector::Any,
            service_id: Some(1),
            add_on_ids: add_ons,
            location_id: Some(1),
            date: NaiveDate::from_ymd_opt(2025, 3, 3),
            time: Some(time.into()),
            client_id: Some(11),
            notes: None,
        }
    }

    #[tokio::test]
    async fn commit_creates_confirmed_appointment_spanning_add_ons() {
        let (service, store) = booking_service().await;

        let appointment = service.commit_booking(request("10:00", vec![2])).await.unwrap();

        assert_eq!(appointment.staff_id, 4);
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
        assert_eq!(appointment.start_time, Utc.with_ymd_and_hms(2025, 3, 3, 16, 0, 0).unwrap());
        assert_eq!(
            appointment.end_time,
            Some(Utc.with_ymd_and_hms(2025, 3, 3, 17, 15, 0).unwrap())
        );
        assert_eq!(store.all().await.len(), 1);
    }

    #[tokio::test]
    async fn second_commit_for_same_slot_loses() {
        let (service, _) = booking_service().await;

        service.commit_booking(request("10:00", Vec::new())).await.unwrap();
        let err = service.commit_booking(request("10:30", Vec::new())).await.unwrap_err();

        assert!(matches!(err, SalonError::SlotNoLongerAvailable { .. }));
    }

    #[tokio::test]
    async fn missing_fields_are_validation_failures() {
        let (service, _) = booking_service().await;

        let mut no_date = request("10:00", Vec::new());
        no_date.date = None;
        assert!(matches!(service.commit_booking(no_date).await, Err(SalonError::Validation(_))));

        let bad_time = request("ten", Vec::new());
        assert!(matches!(service.commit_booking(bad_time).await, Err(SalonError::Validation(_))));

        let mut no_service = request("10:00", Vec::new());
        no_service.service_id = None;
        assert!(matches!(service.commit_booking(no_service).await, Err(SalonError::Validation(_))));
    }

    #[tokio::test]
    async fn add_on_for_another_base_is_rejected() {
        let (service, _) = booking_service().await;

        let err = service.commit_booking(request("10:00", vec![3])).await.unwrap_err();
        assert!(matches!(err, SalonError::Validation(_)));

        let err = service.commit_booking(request("10:00", vec![1])).await.unwrap_err();
        assert!(matches!(err, SalonError::Validation(_)));
    }

    #[tokio::test]
    async fn past_slots_cannot_be_committed() {
        let (service, _) = booking_service().await;
        let mut past = request("10:00", Vec::new());
        past.date = NaiveDate::from_ymd_opt(2025, 2, 24);

        assert!(matches!(
            service.commit_booking(past).await,
            Err(SalonError::SlotNoLongerAvailable { .. })
        ));
    }

    #[tokio::test]
    async fn commit_locks_for_past_dates_are_dropped() {
        let (service, _) = booking_service().await;
        let stale = NaiveDate::from_ymd_opt(2025, 2, 24).unwrap();
        service.commit_locks.insert(stale, Arc::default());

        service.commit_booking(request("10:00", Vec::new())).await.unwrap();

        assert!(!service.commit_locks.contains_key(&stale));
        assert!(service.commit_locks.contains_key(&NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()));
    }

    #[tokio::test]
    async fn queries_reflect_committed_bookings() {
        let (service, _) = booking_service().await;
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let query = SlotQuery {
            staff: StaffSelector::Any,
            selection: ServiceSelection::single(1),
            location_id: 1,
        };

        let before = service.available_slots(&query, monday).await.unwrap();
        service.commit_booking(request("10:00", Vec::new())).await.unwrap();
        let after = service.available_slots(&query, monday).await.unwrap();

        assert_eq!(before.len(), 15);
        assert_eq!(after.len(), 12);
        assert!(after.iter().all(|slot| slot.staff_ids == vec![4]));
        assert_eq!(service.eligible_staff(1, 1).await.unwrap(), vec![4]);
        assert!(service.eligible_staff(2, 1).await.unwrap().is_empty());
    }
}
