//! Durable payment status cache.
//!
//! `merge` runs read-merge-write inside one IMMEDIATE transaction so two
//! webhooks for the same payment cannot interleave.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use salonbook_core::payments::ports::PaymentStatusCache;
use salonbook_core::payments::{reconcile, storage_keys};
use salonbook_domain::{PaymentStatusRecord, Result, SalonError};
use tokio::task;
use tracing::debug;

use super::manager::{map_join_error, map_sql_error, DbManager};

pub struct SqlitePaymentStatusCache {
    db: Arc<DbManager>,
}

impl SqlitePaymentStatusCache {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentStatusCache for SqlitePaymentStatusCache {
    async fn get(&self, key: &str) -> Result<Option<PaymentStatusRecord>> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();

        task::spawn_blocking(move || -> Result<Option<PaymentStatusRecord>> {
            let conn = db.get_connection()?;
            let json: Option<String> = conn
                .query_row(
                    "SELECT record_json FROM payment_status WHERE status_key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
                .map_err(map_sql_error)?;
            json.as_deref().map(decode_record).transpose()
        })
        .await
        .map_err(map_join_error)?
    }

    async fn merge(
        &self,
        keys: &[String],
        incoming: PaymentStatusRecord,
    ) -> Result<PaymentStatusRecord> {
        let db = Arc::clone(&self.db);
        let keys = keys.to_vec();

        task::spawn_blocking(move || -> Result<PaymentStatusRecord> {
            let mut conn = db.get_connection()?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(map_sql_error)?;

            let mut stored: Vec<PaymentStatusRecord> = Vec::new();
            for key in storage_keys(&keys, &incoming) {
                let json: Option<String> = tx
                    .query_row(
                        "SELECT record_json FROM payment_status WHERE status_key = ?1",
                        params![key],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(map_sql_error)?;
                if let Some(record) = json.as_deref().map(decode_record).transpose()? {
                    if !stored.contains(&record) {
                        stored.push(record);
                    }
                }
            }

            let merged = reconcile(&stored, incoming);
            let json = serde_json::to_string(&merged)
                .map_err(|err| SalonError::Internal(format!("encode payment status: {err}")))?;
            let written = storage_keys(&keys, &merged);
            for key in &written {
                tx.execute(
                    "INSERT INTO payment_status (status_key, status, record_json, updated_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(status_key) DO UPDATE SET
                        status = excluded.status,
                        record_json = excluded.record_json,
                        updated_at = excluded.updated_at",
                    params![key, merged.status.to_string(), json, merged.updated_at.timestamp()],
                )
                .map_err(map_sql_error)?;
            }
            tx.commit().map_err(map_sql_error)?;

            debug!(keys = ?written, status = %merged.status, "payment status persisted");
            Ok(merged)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn decode_record(json: &str) -> Result<PaymentStatusRecord> {
    serde_json::from_str(json)
        .map_err(|err| SalonError::Persistence(format!("corrupt payment status record: {err}")))
}
