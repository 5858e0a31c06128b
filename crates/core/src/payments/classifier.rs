//! Webhook outcome classification
//!
//! Allow-lists only. A payload that matches neither list stays `pending`;
//! it is never promoted to `completed` by default. Failure markers win over
//! success markers found in the same payload.

use salonbook_domain::{PaymentStatus, RawWebhookPayload};

const CANCELLED_MARKERS: &[&str] =
    &["cancelled", "canceled", "cancel", "voided", "void", "refunded", "refund", "terminalcancel"];
const FAILED_MARKERS: &[&str] = &["declined", "decline", "failed", "failure", "error", "denied"];
const SUCCESS_STATUSES: &[&str] =
    &["approved", "approval", "completed", "complete", "paid", "success", "succeeded", "captured"];
const SUCCESS_EVENT_TYPES: &[&str] = &["cardtransaction"];

pub fn classify(payload: &RawWebhookPayload) -> PaymentStatus {
    let status = payload.status.as_deref().map(normalize);
    let event_type = payload.event_type.as_deref().map(normalize);
    let any_marker = |markers: &[&str]| {
        [status.as_deref(), event_type.as_deref()]
            .into_iter()
            .flatten()
            .any(|value| markers.contains(&value))
    };

    if any_marker(CANCELLED_MARKERS) {
        return PaymentStatus::Cancelled;
    }
    if payload.approved == Some(false) || any_marker(FAILED_MARKERS) {
        return PaymentStatus::Failed;
    }

    let success_status = status.as_deref().is_some_and(|s| SUCCESS_STATUSES.contains(&s));
    let success_type = event_type.as_deref().is_some_and(|t| SUCCESS_EVENT_TYPES.contains(&t));
    if payload.approved == Some(true) || success_status || success_type {
        return PaymentStatus::Completed;
    }

    PaymentStatus::Pending
}

/// Lower-case and strip separators so `Card_Transaction` matches `cardtransaction`.
fn normalize(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).map(|c| c.to_ascii_lowercase()).collect()
}
