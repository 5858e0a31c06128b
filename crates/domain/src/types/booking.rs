//! Booking queries and commit requests

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ClientId, LocationId, ServiceId, StaffId};

/// Which staff member a query or booking targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaffSelector {
    /// "Any available" sentinel, resolved to a concrete staff member at
    /// commit time.
    Any,
    Specific(StaffId),
}

impl FromStr for StaffSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        trimmed
            .parse::<StaffId>()
            .map(Self::Specific)
            .map_err(|_| format!("Invalid StaffSelector: {s}"))
    }
}

impl fmt::Display for StaffSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Specific(id) => write!(f, "{id}"),
        }
    }
}

impl Serialize for StaffSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Any => serializer.serialize_str("any"),
            Self::Specific(id) => serializer.serialize_i64(*id),
        }
    }
}

impl<'de> Deserialize<'de> for StaffSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Id(StaffId),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Id(id) => Ok(Self::Specific(id)),
            Wire::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Base service plus optional add-ons booked together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub service_id: ServiceId,
    #[serde(default)]
    pub add_on_ids: Vec<ServiceId>,
}

impl ServiceSelection {
    pub fn single(service_id: ServiceId) -> Self {
        Self { service_id, add_on_ids: Vec::new() }
    }

    pub fn with_add_ons(service_id: ServiceId, add_on_ids: Vec<ServiceId>) -> Self {
        Self { service_id, add_on_ids }
    }
}

/// One entry of the fixed business-day grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlot {
    pub hour: u32,
    pub minute: u32,
    /// Display label, e.g. `9:30 AM`.
    pub label: String,
}

impl DaySlot {
    pub fn minute_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

/// A bookable slot returned to the booking UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub label: String,
    /// Staff members free for the whole slot, ascending.
    pub staff_ids: Vec<StaffId>,
}

/// Commit request coming from the booking UI.
///
/// Fields are optional on the wire so that missing input is reported as a
/// validation failure instead of a deserialization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default = "any_staff")]
    pub staff: StaffSelector,
    #[serde(default)]
    pub service_id: Option<ServiceId>,
    #[serde(default)]
    pub add_on_ids: Vec<ServiceId>,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Slot start as `HH:MM`.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub client_id: Option<ClientId>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn any_staff() -> StaffSelector {
    StaffSelector::Any
}
