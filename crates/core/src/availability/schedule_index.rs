//! Per-staff, per-weekday working and blocked windows

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate, Weekday};
use salonbook_domain::{LocationId, StaffId, StaffSchedule};
use tracing::debug;

/// Half-open interval of minutes since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteWindow {
    pub start_min: i64,
    pub end_min: i64,
}

impl MinuteWindow {
    pub fn new(start_min: i64, end_min: i64) -> Self {
        Self { start_min, end_min }
    }

    /// Zero-length and inverted windows contribute nothing.
    pub fn is_empty(&self) -> bool {
        self.end_min <= self.start_min
    }

    /// `other` fits entirely inside `self`.
    pub fn contains(&self, other: &Self) -> bool {
        other.start_min >= self.start_min && other.end_min <= self.end_min
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_min < other.end_min && self.end_min > other.start_min
    }
}

#[derive(Debug, Clone)]
struct IndexedRow {
    location_id: Option<LocationId>,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    window: MinuteWindow,
    is_blocked: bool,
}

impl IndexedRow {
    fn applies(&self, date: NaiveDate, location_id: LocationId) -> bool {
        self.location_id.map_or(true, |loc| loc == location_id)
            && self.start_date <= date
            && self.end_date.map_or(true, |end| date <= end)
    }
}

/// Schedule rows indexed by staff member and weekday.
#[derive(Debug, Clone, Default)]
pub struct ScheduleIndex {
    rows: HashMap<(StaffId, Weekday), Vec<IndexedRow>>,
}

impl ScheduleIndex {
    pub fn new(schedules: &[StaffSchedule]) -> Self {
        let mut rows: HashMap<(StaffId, Weekday), Vec<IndexedRow>> = HashMap::new();

        for schedule in schedules {
            let Some(weekday) = schedule.weekday() else {
                debug!(
                    schedule_id = schedule.id,
                    day_of_week = %schedule.day_of_week,
                    "skipping schedule row with unrecognised weekday"
                );
                continue;
            };

            rows.entry((schedule.staff_id, weekday)).or_default().push(IndexedRow {
                location_id: schedule.location_id,
                start_date: schedule.start_date,
                end_date: schedule.end_date,
                window: MinuteWindow::new(
                    parse_minutes(&schedule.start_time),
                    parse_minutes(&schedule.end_time),
                ),
                is_blocked: schedule.is_blocked,
            });
        }

        Self { rows }
    }

    /// Staff with at least one working (non-blocked) row usable at `location_id`.
    pub fn staff_with_schedule_at(&self, location_id: LocationId) -> BTreeSet<StaffId> {
        self.rows
            .iter()
            .filter(|(_, rows)| {
                rows.iter().any(|row| {
                    !row.is_blocked && row.location_id.map_or(true, |loc| loc == location_id)
                })
            })
            .map(|((staff_id, _), _)| *staff_id)
            .collect()
    }

    pub fn working_windows_for(
        &self,
        staff_id: StaffId,
        date: NaiveDate,
        location_id: LocationId,
    ) -> Vec<MinuteWindow> {
        self.windows_for(staff_id, date, location_id, false)
    }

    pub fn blocked_windows_for(
        &self,
        staff_id: StaffId,
        date: NaiveDate,
        location_id: LocationId,
    ) -> Vec<MinuteWindow> {
        self.windows_for(staff_id, date, location_id, true)
    }

    fn windows_for(
        &self,
        staff_id: StaffId,
        date: NaiveDate,
        location_id: LocationId,
        blocked: bool,
    ) -> Vec<MinuteWindow> {
        let Some(rows) = self.rows.get(&(staff_id, date.weekday())) else {
            return Vec::new();
        };

        let mut windows: Vec<MinuteWindow> = rows
            .iter()
            .filter(|row| row.is_blocked == blocked && row.applies(date, location_id))
            .map(|row| row.window)
            .filter(|window| !window.is_empty())
            .collect();
        windows.sort();
        windows
    }
}

/// Minutes since midnight for an `HH:MM` (or `HH:MM:SS`) string. Missing or
/// malformed components count as zero.
pub fn parse_minutes(raw: &str) -> i64 {
    let mut parts = raw.trim().split(':');
    let mut component = || {
        parts.next().and_then(|part| part.trim().parse::<i64>().ok()).unwrap_or(0).max(0)
    };
    let hours = component();
    let minutes = component();
    hours * 60 + minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(staff_id: StaffId, location_id: Option<LocationId>, day: &str, start: &str, end: &str) -> StaffSchedule {
        StaffSchedule {
            id: 0,
            staff_id,
            location_id,
            day_of_week: day.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            start_date: date(2025, 1, 1),
            end_date: None,
            is_blocked: false,
        }
    }

    #[test]
    fn parse_minutes_defaults_missing_components() {
        assert_eq!(parse_minutes("09:30"), 570);
        assert_eq!(parse_minutes("17"), 1020);
        assert_eq!(parse_minutes("ab:15"), 15);
        assert_eq!(parse_minutes(""), 0);
        assert_eq!(parse_minutes("08:00:59"), 480);
    }

    #[test]
    fn working_windows_respect_weekday_location_and_date_range() {
        let mut ended = row(1, Some(2), "Monday", "12:00", "14:00");
        ended.end_date = Some(date(2025, 2, 28));
        let index = ScheduleIndex::new(&[
            row(1, Some(1), "Monday", "09:00", "17:00"),
            row(1, None, "Monday", "18:00", "20:00"),
            row(1, Some(1), "Tuesday", "09:00", "12:00"),
            ended,
        ]);
        let monday = date(2025, 3, 3);

        assert_eq!(
            index.working_windows_for(1, monday, 1),
            vec![MinuteWindow::new(540, 1020), MinuteWindow::new(1080, 1200)]
        );
        assert_eq!(index.working_windows_for(1, monday, 2), vec![MinuteWindow::new(1080, 1200)]);
        assert_eq!(
            index.working_windows_for(1, date(2025, 2, 24), 2),
            vec![MinuteWindow::new(720, 840), MinuteWindow::new(1080, 1200)]
        );
        assert!(index.working_windows_for(2, monday, 1).is_empty());
    }

    #[test]
    fn schedule_not_started_yet_is_ignored() {
        let mut future = row(4, Some(1), "Monday", "09:00", "17:00");
        future.start_date = date(2025, 6, 1);
        let index = ScheduleIndex::new(&[future]);

        assert!(index.working_windows_for(4, date(2025, 3, 3), 1).is_empty());
        assert!(!index.working_windows_for(4, date(2025, 6, 2), 1).is_empty());
    }

    #[test]
    fn inverted_and_blocked_rows_are_separated() {
        let mut lunch = row(1, Some(1), "Monday", "12:00", "13:00");
        lunch.is_blocked = true;
        let index = ScheduleIndex::new(&[
            row(1, Some(1), "Monday", "17:00", "09:00"),
            row(1, Some(1), "Monday", "09:00", "17:00"),
            lunch,
        ]);
        let monday = date(2025, 3, 3);

        assert_eq!(index.working_windows_for(1, monday, 1), vec![MinuteWindow::new(540, 1020)]);
        assert_eq!(index.blocked_windows_for(1, monday, 1), vec![MinuteWindow::new(720, 780)]);
    }

    #[test]
    fn staff_with_schedule_at_ignores_blocked_only_staff() {
        let mut blocked = row(3, Some(1), "Friday", "09:00", "17:00");
        blocked.is_blocked = true;
        let index = ScheduleIndex::new(&[
            row(2, Some(1), "Monday", "09:00", "17:00"),
            row(1, None, "Monday", "09:00", "17:00"),
            row(5, Some(2), "Monday", "09:00", "17:00"),
            row(6, Some(1), "Someday", "09:00", "17:00"),
            blocked,
        ]);

        assert_eq!(index.staff_with_schedule_at(1).into_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(index.staff_with_schedule_at(2).into_iter().collect::<Vec<_>>(), vec![1, 5]);
    }
}
