//! HTTP routes

pub mod availability;
pub mod bookings;
pub mod error;
pub mod health;
pub mod payments;
pub mod webhooks;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

pub use error::{ApiError, ApiResult, ErrorResponse};

use crate::AppContext;

/// Every route, sharing one [`AppContext`].
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/availability/slots", get(availability::list_slots))
        .route("/availability/dates", get(availability::list_dates))
        .route("/bookings", post(bookings::commit_booking))
        .route("/terminal/payments", post(payments::start_payment))
        .route("/terminal/payments/{key}", get(payments::payment_status))
        .route("/terminal/payments/{key}/transaction", post(payments::attach_transaction))
        .route("/webhooks/terminal", post(webhooks::terminal_webhook))
        .with_state(ctx)
}
