//! Staff schedule read model

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::{LocationId, StaffId};

/// One recurring weekly window for a staff member.
///
/// `is_blocked = false` rows are working windows; `is_blocked = true` rows
/// carve unavailability out of a working day. Times are `HH:MM` wall-clock
/// strings in the business timezone and are kept raw so malformed rows can be
/// handled by the schedule index instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSchedule {
    #[serde(default)]
    pub id: i64,
    pub staff_id: StaffId,
    /// `None` applies to every location.
    #[serde(default)]
    pub location_id: Option<LocationId>,
    /// Weekday name, e.g. `Monday`.
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub start_date: NaiveDate,
    /// `None` is open-ended.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_blocked: bool,
}

impl StaffSchedule {
    /// Parsed weekday, `None` when the stored name is unrecognised.
    pub fn weekday(&self) -> Option<Weekday> {
        self.day_of_week.trim().parse::<Weekday>().ok()
    }
}
