//! Payment status merge rule and the in-memory status cache

use std::collections::HashMap;

use async_trait::async_trait;
use salonbook_domain::{PaymentStatusRecord, Result};
use tokio::sync::RwLock;

use super::ports::PaymentStatusCache;

/// Fold `incoming` into `existing`.
///
/// - Without a prior record the incoming one is taken as is (including
///   `pending`).
/// - A terminal status is never replaced. A later webhook carrying the same
///   terminal status, or a pending one, may refine amounts and identifiers.
/// - A later webhook with a *different* terminal status only fills gaps.
/// - A pending record takes whatever status arrives next.
pub fn merge_records(
    existing: Option<&PaymentStatusRecord>,
    incoming: PaymentStatusRecord,
) -> PaymentStatusRecord {
    let Some(existing) = existing else {
        return incoming;
    };

    let conflicting = existing.status.is_terminal()
        && incoming.status.is_terminal()
        && existing.status != incoming.status;
    let status = if existing.status.is_terminal() { existing.status } else { incoming.status };
    let updated_at = existing.updated_at.max(incoming.updated_at);

    if conflicting {
        return PaymentStatusRecord {
            status,
            invoice_number: existing.invoice_number.clone().or(incoming.invoice_number),
            transaction_id: existing.transaction_id.clone().or(incoming.transaction_id),
            last4: existing.last4.clone().or(incoming.last4),
            amount: existing.amount.or(incoming.amount),
            tip_amount: existing.tip_amount.or(incoming.tip_amount),
            base_amount: existing.base_amount.or(incoming.base_amount),
            updated_at,
        };
    }

    PaymentStatusRecord {
        status,
        invoice_number: incoming.invoice_number.or_else(|| existing.invoice_number.clone()),
        transaction_id: incoming.transaction_id.or_else(|| existing.transaction_id.clone()),
        last4: incoming.last4.or_else(|| existing.last4.clone()),
        amount: incoming.amount.or(existing.amount),
        tip_amount: incoming.tip_amount.or(existing.tip_amount),
        base_amount: incoming.base_amount.or(existing.base_amount),
        updated_at,
    }
}

/// Merge every record already filed under `keys` (in key order) and then
/// `incoming`. Used to reconcile an orphan record with its session record.
pub fn reconcile(stored: &[PaymentStatusRecord], incoming: PaymentStatusRecord) -> PaymentStatusRecord {
    let prior = stored.iter().fold(None::<PaymentStatusRecord>, |acc, record| {
        Some(merge_records(acc.as_ref(), record.clone()))
    });
    merge_records(prior.as_ref(), incoming)
}

/// Every key a merged record should be filed under, deduplicated in order.
pub fn storage_keys(keys: &[String], record: &PaymentStatusRecord) -> Vec<String> {
    let mut all: Vec<String> = Vec::with_capacity(keys.len() + 2);
    for key in keys.iter().cloned().chain(record.keys()) {
        if !key.is_empty() && !all.contains(&key) {
            all.push(key);
        }
    }
    all
}

/// Process-lifetime status cache.
#[derive(Debug, Default)]
pub struct InMemoryPaymentStatusCache {
    records: RwLock<HashMap<String, PaymentStatusRecord>>,
}

impl InMemoryPaymentStatusCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStatusCache for InMemoryPaymentStatusCache {
    async fn get(&self, key: &str) -> Result<Option<PaymentStatusRecord>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn merge(
        &self,
        keys: &[String],
        incoming: PaymentStatusRecord,
    ) -> Result<PaymentStatusRecord> {
        let mut records = self.records.write().await;

        let mut stored: Vec<PaymentStatusRecord> = Vec::new();
        for key in storage_keys(keys, &incoming) {
            if let Some(record) = records.get(&key) {
                if !stored.contains(record) {
                    stored.push(record.clone());
                }
            }
        }

        let merged = reconcile(&stored, incoming);
        for key in storage_keys(keys, &merged) {
            records.insert(key, merged.clone());
        }
        Ok(merged)
    }
}
