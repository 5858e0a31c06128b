//! Per-staff appointment timelines keyed by business date

use std::collections::HashMap;

use chrono::NaiveDate;
use salonbook_domain::{Appointment, AppointmentId, StaffId};

use super::duration::DurationResolver;
use super::schedule_index::MinuteWindow;
use super::wall_clock::BusinessClock;

/// Time an existing appointment occupies on its business date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedInterval {
    pub appointment_id: AppointmentId,
    pub start_min: i64,
    pub end_min: i64,
}

impl BookedInterval {
    pub fn window(&self) -> MinuteWindow {
        MinuteWindow::new(self.start_min, self.end_min)
    }
}

/// Appointments of every location grouped by staff member and business date.
///
/// Location is deliberately ignored: a staff member booked at one location is
/// unavailable at all others for that time.
#[derive(Debug, Clone, Default)]
pub struct AppointmentIndex {
    timelines: HashMap<(StaffId, NaiveDate), Vec<BookedInterval>>,
}

impl AppointmentIndex {
    pub fn new(
        appointments: &[Appointment],
        clock: &BusinessClock,
        durations: &DurationResolver,
    ) -> Self {
        let mut timelines: HashMap<(StaffId, NaiveDate), Vec<BookedInterval>> = HashMap::new();

        for appointment in appointments.iter().filter(|a| a.status.blocks_time()) {
            let start_min = clock.minute_of_day(appointment.start_time);
            let span = appointment
                .end_time
                .map(|end| end - appointment.start_time)
                .map(|span| (span.num_seconds() + 59) / 60)
                .filter(|minutes| *minutes > 0)
                .unwrap_or_else(|| {
                    durations.resolve_with_add_ons(appointment.service_id, &appointment.add_on_ids)
                });

            timelines
                .entry((appointment.staff_id, clock.local_date(appointment.start_time)))
                .or_default()
                .push(BookedInterval {
                    appointment_id: appointment.id,
                    start_min,
                    end_min: start_min + span,
                });
        }

        for timeline in timelines.values_mut() {
            timeline.sort_by_key(|interval| (interval.start_min, interval.appointment_id));
        }

        Self { timelines }
    }

    /// Blocking appointments for `staff_id` on `date`, ascending by start.
    pub fn timeline_for(&self, staff_id: StaffId, date: NaiveDate) -> &[BookedInterval] {
        self.timelines.get(&(staff_id, date)).map(Vec::as_slice).unwrap_or_default()
    }
}
