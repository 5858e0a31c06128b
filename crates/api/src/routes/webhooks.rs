//! Payment processor webhook ingress
//!
//! The processor retries on anything but `200`, and every failure here is
//! already recorded on our side, so the endpoint always acknowledges.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use salonbook_domain::RawWebhookPayload;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::AppContext;

/// Acknowledgement body. The processor only needs the 200.
#[derive(Debug, Default, Serialize)]
pub struct WebhookAck {
    /// Always true once the request reached the handler.
    pub received: bool,
    /// How the webhook was tied to a session, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<String>,
    /// Status recorded for the payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// `POST /webhooks/terminal`
pub async fn terminal_webhook(State(ctx): State<Arc<AppContext>>, body: Bytes) -> Json<WebhookAck> {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, bytes = body.len(), "unparseable terminal webhook ignored");
            return Json(WebhookAck { received: true, ..WebhookAck::default() });
        }
    };

    match ctx.payments.handle_webhook(RawWebhookPayload::from(value)).await {
        Ok(outcome) => Json(WebhookAck {
            received: true,
            matched_by: Some(outcome.matched_by.to_string()),
            status: Some(outcome.record.status.to_string()),
        }),
        Err(err) => {
            error!(error = %err, code = err.label(), "terminal webhook processing failed");
            Json(WebhookAck { received: true, ..WebhookAck::default() })
        }
    }
}
