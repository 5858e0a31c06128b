//! Webhook correlation
//!
//! Pipeline per webhook: classify from the payload, match a session, compute
//! the tip, write the status record, and only then try to enrich it from the
//! payment processor. Enrichment never gates the first write.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use salonbook_common::time::Clock;
use salonbook_domain::constants::{ENRICHMENT_TIMEOUT_MS, RECENCY_WINDOW_SECS};
use salonbook_domain::{
    round2, PaymentStatus, PaymentStatusRecord, RawWebhookPayload, Result, SalonError,
    TerminalPaymentSession,
};
use tracing::{debug, error, info, warn};

use super::classifier::classify;
use super::ports::{PaymentEnricher, PaymentStatusCache, TerminalSessionStore};

/// How a webhook was tied to its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPath {
    Invoice,
    Transaction,
    /// Most recent session inside the recency window. Lossy.
    Recency,
    /// No session; the record is kept under the webhook's own identifiers.
    Orphan,
}

impl fmt::Display for MatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Invoice => "invoice",
            Self::Transaction => "transaction",
            Self::Recency => "recency",
            Self::Orphan => "orphan",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationOutcome {
    pub matched_by: MatchPath,
    /// Classification of this webhook alone.
    pub classified: PaymentStatus,
    /// Record as stored after merging.
    pub record: PaymentStatusRecord,
}

pub struct WebhookCorrelator {
    sessions: Arc<dyn TerminalSessionStore>,
    statuses: Arc<dyn PaymentStatusCache>,
    enricher: Option<Arc<dyn PaymentEnricher>>,
    clock: Arc<dyn Clock>,
    recency_window: Duration,
    enrichment_timeout: std::time::Duration,
}

impl WebhookCorrelator {
    pub fn new(
        sessions: Arc<dyn TerminalSessionStore>,
        statuses: Arc<dyn PaymentStatusCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            statuses,
            enricher: None,
            clock,
            recency_window: Duration::seconds(RECENCY_WINDOW_SECS as i64),
            enrichment_timeout: std::time::Duration::from_millis(ENRICHMENT_TIMEOUT_MS),
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn PaymentEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_recency_window(mut self, window: Duration) -> Self {
        self.recency_window = window;
        self
    }

    pub fn with_enrichment_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.enrichment_timeout = timeout;
        self
    }

    /// Process one webhook delivery.
    ///
    /// On failure a minimal `pending` record is still written under the
    /// transaction id so pollers never see "no record at all".
    pub async fn handle(&self, payload: RawWebhookPayload) -> Result<CorrelationOutcome> {
        match self.correlate(&payload).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(
                    error = %err,
                    invoice_number = ?payload.invoice_number,
                    transaction_id = ?payload.transaction_id,
                    "webhook correlation failed"
                );
                self.write_fallback(&payload).await;
                Err(err)
            }
        }
    }

    async fn write_fallback(&self, payload: &RawWebhookPayload) {
        let Some(transaction_id) = payload.transaction_id.clone() else {
            warn!("webhook without transaction id; no fallback record written");
            return;
        };
        let mut fallback = PaymentStatusRecord::pending(self.clock.now());
        fallback.transaction_id = Some(transaction_id.clone());

        match self.statuses.merge(std::slice::from_ref(&transaction_id), fallback).await {
            Ok(record) => {
                info!(%transaction_id, status = %record.status, "fallback payment status written")
            }
            Err(err) => error!(error = %err, %transaction_id, "fallback payment status write failed"),
        }
    }

    async fn correlate(&self, payload: &RawWebhookPayload) -> Result<CorrelationOutcome> {
        let classified = classify(payload);
        let (session, matched_by) = self.find_session(payload).await?;

        if let Some(session) = &session {
            self.remember_transaction(session, payload.transaction_id.as_deref()).await?;
        }

        let record = build_record(payload, classified, session.as_ref(), self.clock.now());
        let keys = record.keys();
        if keys.is_empty() {
            return Err(SalonError::CorrelationAmbiguous(
                "webhook carries neither invoice number nor transaction id".into(),
            ));
        }

        let mut stored = self.statuses.merge(&keys, record).await?;
        info!(
            matched_by = %matched_by,
            classified = %classified,
            status = %stored.status,
            invoice_number = ?stored.invoice_number,
            transaction_id = ?stored.transaction_id,
            "payment status recorded"
        );

        if stored.status == PaymentStatus::Pending {
            if let Some(enriched) = self.enrich(&stored, session.as_ref()).await {
                stored = enriched;
            }
        }

        Ok(CorrelationOutcome { matched_by, classified, record: stored })
    }

    async fn find_session(
        &self,
        payload: &RawWebhookPayload,
    ) -> Result<(Option<TerminalPaymentSession>, MatchPath)> {
        if let Some(invoice) = payload.invoice_number.as_deref() {
            if let Some(session) = self.sessions.get(invoice).await? {
                return Ok((Some(session), MatchPath::Invoice));
            }
        }

        if let Some(tx) = payload.transaction_id.as_deref() {
            if let Some(session) = self.sessions.get(tx).await? {
                return Ok((Some(session), MatchPath::Transaction));
            }
        }

        // An explicit invoice we do not know belongs to someone else, and a
        // session already tied to another transaction is not a candidate.
        if payload.invoice_number.is_none() {
            let since = self.clock.now() - self.recency_window;
            let unclaimed = self.sessions.recent(since).await?.into_iter().find(|session| {
                session.helcim_tx_id.is_none()
                    || session.helcim_tx_id.as_deref() == payload.transaction_id.as_deref()
            });
            if let Some(session) = unclaimed {
                debug!(invoice_number = %session.invoice_number, "webhook matched by recency");
                return Ok((Some(session), MatchPath::Recency));
            }
        }

        warn!(
            invoice_number = ?payload.invoice_number,
            transaction_id = ?payload.transaction_id,
            "webhook did not match any terminal session"
        );
        Ok((None, MatchPath::Orphan))
    }

    /// Record the processor's transaction id on the session and alias it.
    async fn remember_transaction(
        &self,
        session: &TerminalPaymentSession,
        transaction_id: Option<&str>,
    ) -> Result<()> {
        let Some(tx) = transaction_id else {
            return Ok(());
        };
        if session.helcim_tx_id.as_deref() != Some(tx) {
            let mut updated = session.clone();
            updated.helcim_tx_id = Some(tx.to_string());
            self.sessions.put(updated).await?;
        }
        self.sessions.link_alias(tx, &session.invoice_number).await?;
        Ok(())
    }

    /// Best-effort refinement of a pending record. Failures are swallowed.
    async fn enrich(
        &self,
        stored: &PaymentStatusRecord,
        session: Option<&TerminalPaymentSession>,
    ) -> Option<PaymentStatusRecord> {
        let enricher = self.enricher.as_ref()?;
        let transaction_id = stored.transaction_id.as_deref()?;

        let fetched =
            tokio::time::timeout(self.enrichment_timeout, enricher.fetch_transaction(transaction_id))
                .await
                .map_err(|_| {
                    SalonError::EnrichmentUnavailable(format!(
                        "timed out after {:?}",
                        self.enrichment_timeout
                    ))
                })
                .and_then(|result| result);

        let transaction = match fetched {
            Ok(transaction) => transaction,
            Err(err) => {
                warn!(error = %err, %transaction_id, "payment enrichment unavailable");
                return None;
            }
        };

        let payload = transaction.as_payload();
        let mut refined = build_record(&payload, classify(&payload), session, self.clock.now());
        // Keep the record's own invoice key even if the processor omits it.
        refined.invoice_number = refined.invoice_number.or_else(|| stored.invoice_number.clone());

        let keys = stored.keys();
        match self.statuses.merge(&keys, refined).await {
            Ok(record) => {
                info!(%transaction_id, status = %record.status, "payment status enriched");
                Some(record)
            }
            Err(err) => {
                warn!(error = %err, %transaction_id, "failed to store enriched payment status");
                None
            }
        }
    }
}

/// Record for one webhook, before merging with what is already stored.
fn build_record(
    payload: &RawWebhookPayload,
    status: PaymentStatus,
    session: Option<&TerminalPaymentSession>,
    now: chrono::DateTime<chrono::Utc>,
) -> PaymentStatusRecord {
    let amount = payload.amount.map(round2);
    let tip_amount = session.and_then(|session| tip_for(session, amount));

    PaymentStatusRecord {
        status,
        invoice_number: session
            .map(|s| s.invoice_number.clone())
            .or_else(|| payload.invoice_number.clone()),
        transaction_id: payload.transaction_id.clone(),
        last4: payload.last4.clone(),
        amount,
        tip_amount,
        base_amount: session.and_then(|s| s.base_amount).map(round2),
        updated_at: now,
    }
}

/// `total - base`, rounded to cents. Omitted (not zeroed) when either side is
/// unknown or the result would be negative.
fn tip_for(session: &TerminalPaymentSession, total: Option<f64>) -> Option<f64> {
    let base = session.base_amount?;
    let tip = round2(total? - base);
    if tip < 0.0 {
        warn!(
            invoice_number = %session.invoice_number,
            base,
            "charged amount below base amount; tip not recorded"
        );
        return None;
    }
    Some(tip)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use salonbook_common::time::MockClock;

    use super::*;
    use crate::payments::ports::EnrichedTransaction;
    use crate::payments::session_store::InMemorySessionStore;
    use crate::payments::status_cache::InMemoryPaymentStatusCache;

    struct Fixture {
        clock: MockClock,
        sessions: Arc<InMemorySessionStore>,
        statuses: Arc<InMemoryPaymentStatusCache>,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = MockClock::at(Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap());
            Self {
                sessions: Arc::new(InMemorySessionStore::new(Arc::new(clock.clone()))),
                statuses: Arc::new(InMemoryPaymentStatusCache::new()),
                clock,
            }
        }

        fn correlator(&self) -> WebhookCorrelator {
            WebhookCorrelator::new(
                self.sessions.clone(),
                self.statuses.clone(),
                Arc::new(self.clock.clone()),
            )
        }

        async fn start_session(&self, invoice: &str, base: f64) {
            self.sessions
                .put(TerminalPaymentSession {
                    invoice_number: invoice.into(),
                    location_id: 1,
                    device_code: "DEV1".into(),
                    started_at: self.clock.now(),
                    total_amount: base,
                    base_amount: Some(base),
                    tip_amount: None,
                    payment_id: None,
                    appointment_id: None,
                    helcim_tx_id: None,
                })
                .await
                .unwrap();
        }
    }

    fn webhook(
        invoice: Option<&str>,
        tx: Option<&str>,
        amount: Option<f64>,
        status: Option<&str>,
    ) -> RawWebhookPayload {
        RawWebhookPayload {
            invoice_number: invoice.map(str::to_string),
            transaction_id: tx.map(str::to_string),
            last4: None,
            amount,
            status: status.map(str::to_string),
            event_type: None,
            approved: None,
        }
    }

    #[tokio::test]
    async fn tip_is_total_minus_base() {
        let fx = Fixture::new();
        fx.start_session("INV1", 45.0).await;

        let outcome = fx
            .correlator()
            .handle(webhook(Some("INV1"), Some("tx-1"), Some(50.0), Some("APPROVED")))
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchPath::Invoice);
        assert_eq!(outcome.record.status, PaymentStatus::Completed);
        assert_eq!(outcome.record.tip_amount, Some(5.0));
        assert_eq!(outcome.record.base_amount, Some(45.0));
        assert_eq!(fx.statuses.get("tx-1").await.unwrap(), Some(outcome.record));
        assert_eq!(
            fx.sessions.get("tx-1").await.unwrap().unwrap().helcim_tx_id.as_deref(),
            Some("tx-1")
        );
    }

    #[tokio::test]
    async fn ambiguous_webhook_is_pending_and_never_downgrades() {
        let fx = Fixture::new();
        fx.start_session("INV1", 45.0).await;
        let correlator = fx.correlator();

        let first = correlator.handle(webhook(Some("INV1"), None, None, None)).await.unwrap();
        assert_eq!(first.record.status, PaymentStatus::Pending);

        correlator.handle(webhook(Some("INV1"), None, Some(50.0), Some("approved"))).await.unwrap();
        let later = correlator.handle(webhook(Some("INV1"), None, None, Some("queued"))).await.unwrap();

        assert_eq!(later.classified, PaymentStatus::Pending);
        assert_eq!(later.record.status, PaymentStatus::Completed);
        assert_eq!(later.record.tip_amount, Some(5.0));
    }

    #[tokio::test]
    async fn transaction_id_and_recency_paths() {
        let fx = Fixture::new();
        fx.start_session("INV1", 20.0).await;
        fx.sessions.link_alias("tx-7", "INV1").await.unwrap();
        let correlator = fx.correlator();

        let by_tx = correlator.handle(webhook(None, Some("tx-7"), None, None)).await.unwrap();
        assert_eq!(by_tx.matched_by, MatchPath::Transaction);

        fx.clock.advance(Duration::minutes(1));
        fx.start_session("INV2", 30.0).await;
        fx.clock.advance(Duration::minutes(1));
        let by_recency =
            correlator.handle(webhook(None, Some("tx-8"), Some(33.0), Some("approved"))).await.unwrap();
        assert_eq!(by_recency.matched_by, MatchPath::Recency);
        assert_eq!(by_recency.record.invoice_number.as_deref(), Some("INV2"));
        assert_eq!(by_recency.record.tip_amount, Some(3.0));
    }

    #[tokio::test]
    async fn stale_sessions_are_not_matched_by_recency() {
        let fx = Fixture::new();
        fx.start_session("INV1", 20.0).await;
        fx.clock.advance(Duration::minutes(6));

        let outcome = fx
            .correlator()
            .handle(webhook(None, Some("tx-1"), Some(25.0), Some("approved")))
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchPath::Orphan);
        assert_eq!(outcome.record.tip_amount, None);
        assert_eq!(outcome.record.invoice_number, None);
        assert!(fx.statuses.get("tx-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_invoice_is_orphaned_without_recency_guess() {
        let fx = Fixture::new();
        fx.start_session("INV1", 20.0).await;

        let outcome = fx
            .correlator()
            .handle(webhook(Some("INV-other"), None, Some(25.0), Some("approved")))
            .await
            .unwrap();

        assert_eq!(outcome.matched_by, MatchPath::Orphan);
        assert!(fx.statuses.get("INV1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unkeyed_webhook_is_ambiguous() {
        let fx = Fixture::new();
        let err = fx.correlator().handle(webhook(None, None, None, None)).await.unwrap_err();
        assert!(matches!(err, SalonError::CorrelationAmbiguous(_)));
    }

    struct FixedEnricher(EnrichedTransaction);

    #[async_trait]
    impl PaymentEnricher for FixedEnricher {
        async fn fetch_transaction(&self, _transaction_id: &str) -> Result<EnrichedTransaction> {
            Ok(self.0.clone())
        }
    }

    struct FailingEnricher;

    #[async_trait]
    impl PaymentEnricher for FailingEnricher {
        async fn fetch_transaction(&self, _transaction_id: &str) -> Result<EnrichedTransaction> {
            Err(SalonError::Network("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn enrichment_refines_pending_records() {
        let fx = Fixture::new();
        fx.start_session("INV1", 45.0).await;
        let correlator = fx.correlator().with_enricher(Arc::new(FixedEnricher(EnrichedTransaction {
            transaction_id: "tx-1".into(),
            invoice_number: None,
            status: Some("APPROVED".into()),
            amount: Some(50.0),
            last4: Some("4242".into()),
        })));

        let outcome = correlator.handle(webhook(Some("INV1"), Some("tx-1"), None, None)).await.unwrap();

        assert_eq!(outcome.classified, PaymentStatus::Pending);
        assert_eq!(outcome.record.status, PaymentStatus::Completed);
        assert_eq!(outcome.record.tip_amount, Some(5.0));
        assert_eq!(outcome.record.last4.as_deref(), Some("4242"));
        assert_eq!(fx.statuses.get("INV1").await.unwrap(), Some(outcome.record));
    }

    #[tokio::test]
    async fn enrichment_failure_keeps_initial_classification() {
        let fx = Fixture::new();
        fx.start_session("INV1", 45.0).await;
        let correlator = fx.correlator().with_enricher(Arc::new(FailingEnricher));

        let outcome = correlator.handle(webhook(Some("INV1"), Some("tx-1"), None, None)).await.unwrap();

        assert_eq!(outcome.record.status, PaymentStatus::Pending);
        assert_eq!(
            fx.statuses.get("tx-1").await.unwrap().map(|r| r.status),
            Some(PaymentStatus::Pending)
        );
    }
}
