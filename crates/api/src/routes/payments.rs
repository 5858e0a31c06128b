//! Terminal payment start, polling and transaction linking

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use salonbook_domain::{PaymentStatusRecord, StartPaymentRequest, TerminalStartResponse};
use serde::Deserialize;

use super::error::ApiResult;
use crate::utils::logging::log_request_outcome;
use crate::AppContext;

/// Body of `POST /terminal/payments/{key}/transaction`.
#[derive(Debug, Deserialize)]
pub struct AttachTransactionRequest {
    /// Processor transaction id; blank values are rejected.
    #[serde(default)]
    pub transaction_id: String,
}

/// `POST /terminal/payments`
pub async fn start_payment(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<StartPaymentRequest>,
) -> ApiResult<(StatusCode, Json<TerminalStartResponse>)> {
    let started = Instant::now();
    let result = ctx.payments.start_payment(request).await;
    log_request_outcome("terminal::start_payment", started.elapsed(), result.as_ref().map(|_| ()));

    Ok((StatusCode::ACCEPTED, Json(result?)))
}

/// `GET /terminal/payments/{key}`; `key` is an invoice number or a
/// transaction id.
pub async fn payment_status(
    State(ctx): State<Arc<AppContext>>,
    Path(key): Path<String>,
) -> ApiResult<Json<PaymentStatusRecord>> {
    Ok(Json(ctx.payments.check_payment_status(&key).await?))
}

/// `POST /terminal/payments/{key}/transaction`
pub async fn attach_transaction(
    State(ctx): State<Arc<AppContext>>,
    Path(invoice): Path<String>,
    Json(request): Json<AttachTransactionRequest>,
) -> ApiResult<Json<PaymentStatusRecord>> {
    Ok(Json(ctx.payments.attach_transaction(&invoice, &request.transaction_id).await?))
}
