//! Fixed business-day slot grid

use chrono::{DateTime, NaiveDate, Utc};
use salonbook_domain::constants::{DAY_GRID_FIRST_HOUR, DAY_GRID_LAST_HOUR, SLOT_STEP_MINUTES};
use salonbook_domain::DaySlot;

use super::wall_clock::BusinessClock;

/// Produces candidate slot starts for a business day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotGenerator {
    clock: BusinessClock,
}

impl SlotGenerator {
    pub fn new(clock: BusinessClock) -> Self {
        Self { clock }
    }

    /// 08:00 through 21:30 in 30-minute steps (28 slots).
    pub fn day_grid() -> Vec<DaySlot> {
        (DAY_GRID_FIRST_HOUR..=DAY_GRID_LAST_HOUR)
            .flat_map(|hour| {
                (0..60).step_by(SLOT_STEP_MINUTES as usize).map(move |minute| DaySlot {
                    hour,
                    minute,
                    label: slot_label(hour, minute),
                })
            })
            .collect()
    }

    /// Drop slots that are no longer bookable relative to `reference`.
    ///
    /// On the reference's business date only slots strictly after the current
    /// wall-clock minute survive; earlier dates have no bookable slots.
    pub fn filter_past(
        &self,
        grid: Vec<DaySlot>,
        reference: DateTime<Utc>,
        date: NaiveDate,
    ) -> Vec<DaySlot> {
        let today = self.clock.local_date(reference);
        if date < today {
            return Vec::new();
        }
        if date > today {
            return grid;
        }

        let now_min = self.clock.minute_of_day(reference);
        grid.into_iter().filter(|slot| i64::from(slot.minute_of_day()) > now_min).collect()
    }
}

/// `9:30 AM` style label.
pub fn slot_label(hour: u32, minute: u32) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{minute:02} {suffix}")
}
