//! Commit-time staff selection

use chrono::{NaiveDate, NaiveTime};
use salonbook_domain::{LocationId, Result, SalonError, ServiceSelection, StaffId, StaffSelector};

use super::engine::AvailabilityEngine;

/// Picks a concrete staff member for a booking using the same containment
/// and overlap rules as slot browsing.
pub struct StaffResolver<'a> {
    engine: &'a AvailabilityEngine,
}

impl<'a> StaffResolver<'a> {
    pub fn new(engine: &'a AvailabilityEngine) -> Self {
        Self { engine }
    }

    /// Staff considered for `selector`, ascending by id.
    ///
    /// A specific staff member outside the eligible set yields no candidates.
    pub fn candidates(selector: StaffSelector, eligible: &[StaffId]) -> Vec<StaffId> {
        let mut candidates: Vec<StaffId> = match selector {
            StaffSelector::Any => eligible.to_vec(),
            StaffSelector::Specific(id) => eligible.iter().copied().filter(|s| *s == id).collect(),
        };
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }

    /// First candidate (ascending id) still free for the whole slot.
    pub fn resolve(
        &self,
        selector: StaffSelector,
        eligible: &[StaffId],
        location_id: LocationId,
        date: NaiveDate,
        start: NaiveTime,
        selection: &ServiceSelection,
    ) -> Result<StaffId> {
        let start_min = super::minute_of(start);
        Self::candidates(selector, eligible)
            .into_iter()
            .find(|staff_id| {
                self.engine.is_slot_available(*staff_id, location_id, date, start_min, selection)
            })
            .ok_or_else(|| SalonError::SlotNoLongerAvailable { date, time: start })
    }
}
