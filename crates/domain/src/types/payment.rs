//! Terminal payment models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AppointmentId, LocationId, PaymentId};
use crate::impl_domain_status_conversions;

/// Round a currency amount to cents.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// An in-flight card terminal payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalPaymentSession {
    /// Primary correlation key.
    pub invoice_number: String,
    pub location_id: LocationId,
    pub device_code: String,
    pub started_at: DateTime<Utc>,
    pub total_amount: f64,
    /// Service cost before tip.
    pub base_amount: Option<f64>,
    pub tip_amount: Option<f64>,
    pub payment_id: Option<PaymentId>,
    pub appointment_id: Option<AppointmentId>,
    pub helcim_tx_id: Option<String>,
}

/// Status reported to polling clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl_domain_status_conversions!(PaymentStatus {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
    Cancelled => "cancelled",
});

impl PaymentStatus {
    /// No transition leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Latest known outcome of a terminal payment.
///
/// Stored under the invoice number and under the transaction id. Stores
/// replace whole values per key so readers never observe a partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusRecord {
    pub status: PaymentStatus,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub tip_amount: Option<f64>,
    #[serde(default)]
    pub base_amount: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentStatusRecord {
    pub fn pending(updated_at: DateTime<Utc>) -> Self {
        Self {
            status: PaymentStatus::Pending,
            invoice_number: None,
            transaction_id: None,
            last4: None,
            amount: None,
            tip_amount: None,
            base_amount: None,
            updated_at,
        }
    }

    /// Keys this record should be filed under.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(2);
        if let Some(invoice) = self.invoice_number.as_deref().filter(|k| !k.is_empty()) {
            keys.push(invoice.to_string());
        }
        if let Some(tx) = self.transaction_id.as_deref().filter(|k| !k.is_empty()) {
            if !keys.iter().any(|k| k == tx) {
                keys.push(tx.to_string());
            }
        }
        keys
    }
}

/// Request to push a purchase to the card terminal at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartPaymentRequest {
    pub location_id: LocationId,
    pub total_amount: f64,
    #[serde(default)]
    pub base_amount: Option<f64>,
    #[serde(default)]
    pub tip_amount: Option<f64>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Overrides the device configured for the location.
    #[serde(default)]
    pub device_code: Option<String>,
    #[serde(default)]
    pub payment_id: Option<PaymentId>,
    #[serde(default)]
    pub appointment_id: Option<AppointmentId>,
}

/// Immediate answer to a start-payment call; the outcome arrives later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalStartResponse {
    pub invoice_number: String,
    pub status: PaymentStatus,
}
