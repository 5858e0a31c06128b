//! Slot and date listings for the booking UI

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use salonbook_core::SlotQuery;
use salonbook_domain::{
    AvailableSlot, LocationId, SalonError, ServiceId, ServiceSelection, StaffSelector,
};
use serde::Deserialize;

use super::error::ApiResult;
use crate::AppContext;

/// Query string shared by both listings.
///
/// `add_on_ids` is a comma-separated list; `staff` is a staff id or `any`.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
    /// Required.
    pub location_id: Option<LocationId>,
    /// Required.
    pub service_id: Option<ServiceId>,
    /// Add-ons appended to the base service.
    pub add_on_ids: Option<String>,
    /// Defaults to `any`.
    pub staff: Option<String>,
    /// Day to list slots for, or the first day of the date window.
    pub date: Option<NaiveDate>,
}

impl AvailabilityParams {
    fn slot_query(&self) -> Result<SlotQuery, SalonError> {
        let location_id = self
            .location_id
            .ok_or_else(|| SalonError::Validation("location_id is required".into()))?;
        let service_id = self
            .service_id
            .ok_or_else(|| SalonError::Validation("service_id is required".into()))?;
        let staff = match self.staff.as_deref() {
            Some(raw) => raw.parse::<StaffSelector>().map_err(SalonError::Validation)?,
            None => StaffSelector::Any,
        };

        Ok(SlotQuery {
            staff,
            selection: ServiceSelection::with_add_ons(service_id, parse_ids(self.add_on_ids.as_deref())?),
            location_id,
        })
    }
}

fn parse_ids(raw: Option<&str>) -> Result<Vec<ServiceId>, SalonError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<ServiceId>()
                .map_err(|_| SalonError::Validation(format!("invalid add-on id '{part}'")))
        })
        .collect()
}

/// `GET /availability/slots`
pub async fn list_slots(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<Json<Vec<AvailableSlot>>> {
    let query = params.slot_query()?;
    let date = params.date.ok_or_else(|| SalonError::Validation("date is required".into()))?;
    Ok(Json(ctx.booking.available_slots(&query, date).await?))
}

/// `GET /availability/dates`; the window starts at `date`, or today.
pub async fn list_dates(
    State(ctx): State<Arc<AppContext>>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<Json<Vec<NaiveDate>>> {
    let query = params.slot_query()?;
    let start = params.date.unwrap_or_else(|| ctx.booking.business_clock().local_date(Utc::now()));
    Ok(Json(ctx.booking.available_dates(&query, start).await?))
}
