//! Booking commit

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use salonbook_domain::{Appointment, BookingRequest};

use super::error::ApiResult;
use crate::utils::logging::log_request_outcome;
use crate::AppContext;

/// `POST /bookings`
pub async fn commit_booking(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<BookingRequest>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let started = Instant::now();
    let result = ctx.booking.commit_booking(request).await;
    log_request_outcome("bookings::commit", started.elapsed(), result.as_ref().map(|_| ()));

    Ok((StatusCode::CREATED, Json(result?)))
}
