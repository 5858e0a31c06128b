//! Availability engine
//!
//! Answers "is staff X free for service Y at minute M on date D" over one
//! consistent snapshot of schedules, appointments and services, and
//! enumerates free slots and days from it. The engine never mutates and never
//! caches across snapshots: callers build a new engine from freshly fetched
//! data for every query and again at commit time.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use salonbook_domain::{
    Appointment, AvailableSlot, LocationId, Service, ServiceSelection, StaffId, StaffSchedule,
    StaffSelector,
};

use super::appointment_index::AppointmentIndex;
use super::duration::DurationResolver;
use super::schedule_index::{MinuteWindow, ScheduleIndex};
use super::slots::SlotGenerator;
use super::wall_clock::BusinessClock;

/// Read models fetched immediately before an availability computation.
#[derive(Debug, Clone, Default)]
pub struct BookingSnapshot {
    pub services: Vec<Service>,
    pub schedules: Vec<StaffSchedule>,
    /// Appointments of every location overlapping the queried dates.
    pub appointments: Vec<Appointment>,
}

/// What the booking UI is asking about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuery {
    pub staff: StaffSelector,
    pub selection: ServiceSelection,
    pub location_id: LocationId,
}

#[derive(Debug, Clone)]
pub struct AvailabilityEngine {
    clock: BusinessClock,
    slots: SlotGenerator,
    schedules: ScheduleIndex,
    appointments: AppointmentIndex,
    durations: DurationResolver,
}

impl AvailabilityEngine {
    pub fn new(clock: BusinessClock, snapshot: &BookingSnapshot) -> Self {
        let durations = DurationResolver::new().with_source(snapshot.services.iter().cloned());
        Self::with_durations(clock, &snapshot.schedules, &snapshot.appointments, durations)
    }

    /// Build with caller-supplied catalog views (e.g. location-scoped first).
    pub fn with_durations(
        clock: BusinessClock,
        schedules: &[StaffSchedule],
        appointments: &[Appointment],
        durations: DurationResolver,
    ) -> Self {
        Self {
            clock,
            slots: SlotGenerator::new(clock),
            schedules: ScheduleIndex::new(schedules),
            appointments: AppointmentIndex::new(appointments, &clock, &durations),
            durations,
        }
    }

    pub fn clock(&self) -> &BusinessClock {
        &self.clock
    }

    pub fn schedules(&self) -> &ScheduleIndex {
        &self.schedules
    }

    pub fn durations(&self) -> &DurationResolver {
        &self.durations
    }

    /// Whether `staff_id` can take `selection` starting at `slot_start_min`.
    pub fn is_slot_available(
        &self,
        staff_id: StaffId,
        location_id: LocationId,
        date: NaiveDate,
        slot_start_min: i64,
        selection: &ServiceSelection,
    ) -> bool {
        let slot_end_min = slot_start_min + self.durations.resolve_selection(selection);
        self.fits(staff_id, location_id, date, MinuteWindow::new(slot_start_min, slot_end_min))
    }

    fn fits(
        &self,
        staff_id: StaffId,
        location_id: LocationId,
        date: NaiveDate,
        slot: MinuteWindow,
    ) -> bool {
        let working = self.schedules.working_windows_for(staff_id, date, location_id);
        if !working.iter().any(|window| window.contains(&slot)) {
            return false;
        }

        let blocked = self.schedules.blocked_windows_for(staff_id, date, location_id);
        if blocked.iter().any(|window| window.overlaps(&slot)) {
            return false;
        }

        // Appointments from every location block, and an identical start
        // always collides regardless of computed spans.
        !self.appointments.timeline_for(staff_id, date).iter().any(|booked| {
            booked.start_min == slot.start_min || booked.window().overlaps(&slot)
        })
    }

    /// Candidates free at `slot_start_min`, in the order given.
    pub fn free_staff_at(
        &self,
        candidates: &[StaffId],
        location_id: LocationId,
        date: NaiveDate,
        slot_start_min: i64,
        selection: &ServiceSelection,
    ) -> Vec<StaffId> {
        let slot_end_min = slot_start_min + self.durations.resolve_selection(selection);
        let slot = MinuteWindow::new(slot_start_min, slot_end_min);
        candidates
            .iter()
            .copied()
            .filter(|staff_id| self.fits(*staff_id, location_id, date, slot))
            .collect()
    }

    /// Bookable slots on `date`; a slot is listed when any candidate is free.
    pub fn available_slots_for(
        &self,
        query: &SlotQuery,
        candidates: &[StaffId],
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Vec<AvailableSlot> {
        if candidates.is_empty() {
            return Vec::new();
        }

        self.slots
            .filter_past(SlotGenerator::day_grid(), now, date)
            .into_iter()
            .filter_map(|slot| {
                let staff_ids = self.free_staff_at(
                    candidates,
                    query.location_id,
                    date,
                    i64::from(slot.minute_of_day()),
                    &query.selection,
                );
                if staff_ids.is_empty() {
                    return None;
                }
                Some(AvailableSlot {
                    date,
                    time: NaiveTime::from_hms_opt(slot.hour, slot.minute, 0)?,
                    label: slot.label,
                    staff_ids,
                })
            })
            .collect()
    }

    /// Days in `[start, start + window_days]` with at least one bookable slot.
    pub fn available_dates_in_range(
        &self,
        query: &SlotQuery,
        candidates: &[StaffId],
        start: NaiveDate,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Vec<NaiveDate> {
        (0..=u64::from(window_days))
            .filter_map(|offset| start.checked_add_days(Days::new(offset)))
            .filter(|date| !self.available_slots_for(query, candidates, *date, now).is_empty())
            .collect()
    }
}
