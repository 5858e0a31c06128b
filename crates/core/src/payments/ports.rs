//! Port interfaces for terminal payments
//!
//! Session and status stores are injected so a deployment can back them with
//! a TTL cache or a database without touching the correlation logic.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use salonbook_domain::{
    PaymentStatusRecord, RawWebhookPayload, Result, TerminalPaymentSession,
};
use serde::{Deserialize, Serialize};

/// Registry of in-flight terminal sessions keyed by invoice number.
#[async_trait]
pub trait TerminalSessionStore: Send + Sync {
    /// Store or replace the session under its invoice number. Implementations
    /// sweep expired sessions opportunistically here.
    async fn put(&self, session: TerminalPaymentSession) -> Result<()>;

    /// Look up by invoice number or by any linked alias.
    async fn get(&self, key: &str) -> Result<Option<TerminalPaymentSession>>;

    /// Make the session stored under `existing_key` reachable as `alias`.
    /// Returns `false` when no such session exists.
    async fn link_alias(&self, alias: &str, existing_key: &str) -> Result<bool>;

    /// Sessions started at or after `since`, newest first.
    async fn recent(&self, since: DateTime<Utc>) -> Result<Vec<TerminalPaymentSession>>;

    /// Drop sessions older than `max_age`; returns how many were removed.
    async fn sweep_expired(&self, max_age: Duration) -> Result<usize>;
}

/// Durable map from correlation key to latest payment status.
#[async_trait]
pub trait PaymentStatusCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<PaymentStatusRecord>>;

    /// Atomically fold `incoming` into whatever is stored under `keys` using
    /// [`merge_records`](super::status_cache::merge_records), then store the
    /// result under every key (plus the record's own keys). Readers observe
    /// either the previous or the merged record, never a mix.
    async fn merge(&self, keys: &[String], incoming: PaymentStatusRecord)
        -> Result<PaymentStatusRecord>;
}

/// Transaction details fetched from the payment processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    pub transaction_id: String,
    pub invoice_number: Option<String>,
    pub status: Option<String>,
    pub amount: Option<f64>,
    pub last4: Option<String>,
}

impl EnrichedTransaction {
    /// View as a webhook payload so one classifier covers both sources.
    pub fn as_payload(&self) -> RawWebhookPayload {
        RawWebhookPayload {
            invoice_number: self.invoice_number.clone(),
            transaction_id: Some(self.transaction_id.clone()),
            last4: self.last4.clone(),
            amount: self.amount,
            status: self.status.clone(),
            event_type: None,
            approved: None,
        }
    }
}

/// Best-effort lookup against the payment processor.
#[async_trait]
pub trait PaymentEnricher: Send + Sync {
    async fn fetch_transaction(&self, transaction_id: &str) -> Result<EnrichedTransaction>;
}

/// Purchase pushed to a physical card terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalPurchase {
    pub device_code: String,
    pub invoice_number: String,
    pub amount: f64,
}

/// Starts purchases on card terminals; the outcome arrives via webhook.
#[async_trait]
pub trait TerminalGateway: Send + Sync {
    async fn start_purchase(&self, purchase: &TerminalPurchase) -> Result<()>;
}
