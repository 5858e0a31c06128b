//! Terminal payment service - start, poll, reconcile, webhook ingress

use std::sync::Arc;

use chrono::Duration;
use salonbook_common::time::{Clock, SystemClock};
use salonbook_domain::constants::INVOICE_PREFIX;
use salonbook_domain::{
    round2, PaymentStatus, PaymentStatusRecord, RawWebhookPayload, Result, SalonError,
    StartPaymentRequest, TerminalConfig, TerminalPaymentSession, TerminalStartResponse,
};
use tracing::{error, info};
use uuid::Uuid;

use super::correlator::{CorrelationOutcome, WebhookCorrelator};
use super::ports::{
    PaymentEnricher, PaymentStatusCache, TerminalGateway, TerminalPurchase, TerminalSessionStore,
};

/// Collaborators the payment service talks to.
#[derive(Clone)]
pub struct PaymentPorts {
    pub sessions: Arc<dyn TerminalSessionStore>,
    pub statuses: Arc<dyn PaymentStatusCache>,
    pub gateway: Arc<dyn TerminalGateway>,
    pub enricher: Option<Arc<dyn PaymentEnricher>>,
}

pub struct TerminalPaymentService {
    sessions: Arc<dyn TerminalSessionStore>,
    statuses: Arc<dyn PaymentStatusCache>,
    gateway: Arc<dyn TerminalGateway>,
    correlator: WebhookCorrelator,
    clock: Arc<dyn Clock>,
    settings: TerminalConfig,
}

impl TerminalPaymentService {
    pub fn new(ports: PaymentPorts, settings: TerminalConfig) -> Self {
        Self::with_clock(ports, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(ports: PaymentPorts, settings: TerminalConfig, clock: Arc<dyn Clock>) -> Self {
        let mut correlator =
            WebhookCorrelator::new(ports.sessions.clone(), ports.statuses.clone(), clock.clone())
                .with_recency_window(Duration::seconds(settings.recency_window_secs as i64))
                .with_enrichment_timeout(std::time::Duration::from_millis(
                    settings.enrichment_timeout_ms,
                ));
        if let Some(enricher) = ports.enricher {
            correlator = correlator.with_enricher(enricher);
        }

        Self {
            sessions: ports.sessions,
            statuses: ports.statuses,
            gateway: ports.gateway,
            correlator,
            clock,
            settings,
        }
    }

    /// Register a session, record it as pending, and push the purchase to
    /// the location's terminal. The outcome arrives later by webhook.
    pub async fn start_payment(&self, request: StartPaymentRequest) -> Result<TerminalStartResponse> {
        if !request.total_amount.is_finite() || request.total_amount <= 0.0 {
            return Err(SalonError::Validation("total_amount must be positive".into()));
        }

        let device_code = request
            .device_code
            .clone()
            .filter(|code| !code.trim().is_empty())
            .or_else(|| self.settings.device_for(request.location_id).map(str::to_string))
            .ok_or_else(|| {
                SalonError::Validation(format!(
                    "no card terminal configured for location {}",
                    request.location_id
                ))
            })?;

        let invoice_number = request
            .invoice_number
            .clone()
            .map(|invoice| invoice.trim().to_string())
            .filter(|invoice| !invoice.is_empty())
            .unwrap_or_else(generate_invoice_number);

        let total_amount = round2(request.total_amount);
        let base_amount = request.base_amount.map(round2);
        let tip_amount = request
            .tip_amount
            .map(round2)
            .or_else(|| base_amount.map(|base| round2(total_amount - base)).filter(|tip| *tip >= 0.0));

        let now = self.clock.now();
        self.sessions
            .put(TerminalPaymentSession {
                invoice_number: invoice_number.clone(),
                location_id: request.location_id,
                device_code: device_code.clone(),
                started_at: now,
                total_amount,
                base_amount,
                tip_amount,
                payment_id: request.payment_id,
                appointment_id: request.appointment_id,
                helcim_tx_id: None,
            })
            .await?;

        let mut pending = PaymentStatusRecord::pending(now);
        pending.invoice_number = Some(invoice_number.clone());
        pending.amount = Some(total_amount);
        pending.base_amount = base_amount;
        pending.tip_amount = tip_amount;
        self.statuses.merge(std::slice::from_ref(&invoice_number), pending).await?;

        let purchase = TerminalPurchase {
            device_code: device_code.clone(),
            invoice_number: invoice_number.clone(),
            amount: total_amount,
        };
        if let Err(err) = self.gateway.start_purchase(&purchase).await {
            error!(error = %err, %invoice_number, %device_code, "terminal purchase could not be started");
            let mut failed = PaymentStatusRecord::pending(self.clock.now());
            failed.status = PaymentStatus::Failed;
            failed.invoice_number = Some(invoice_number.clone());
            self.statuses.merge(std::slice::from_ref(&invoice_number), failed).await?;
            return Err(err);
        }

        info!(
            %invoice_number,
            location_id = request.location_id,
            %device_code,
            total_amount,
            "terminal payment started"
        );
        Ok(TerminalStartResponse { invoice_number, status: PaymentStatus::Pending })
    }

    /// Latest record under `key` (invoice number or transaction id).
    pub async fn check_payment_status(&self, key: &str) -> Result<PaymentStatusRecord> {
        if let Some(record) = self.statuses.get(key).await? {
            return Ok(record);
        }

        if let Some(tx) = self.sessions.get(key).await?.and_then(|session| session.helcim_tx_id) {
            if let Some(record) = self.statuses.get(&tx).await? {
                return Ok(record);
            }
        }

        Err(SalonError::NotFound(format!("no payment status for '{key}'")))
    }

    /// Tie a processor transaction id to an invoice and fold in any orphan
    /// record that arrived under that transaction id first.
    pub async fn attach_transaction(
        &self,
        invoice_number: &str,
        transaction_id: &str,
    ) -> Result<PaymentStatusRecord> {
        let transaction_id = transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(SalonError::Validation("transaction_id is required".into()));
        }

        let mut session = self.sessions.get(invoice_number).await?.ok_or_else(|| {
            SalonError::NotFound(format!("no terminal session for '{invoice_number}'"))
        })?;
        if session.helcim_tx_id.as_deref() != Some(transaction_id) {
            session.helcim_tx_id = Some(transaction_id.to_string());
            self.sessions.put(session.clone()).await?;
        }
        self.sessions.link_alias(transaction_id, &session.invoice_number).await?;

        let mut link = PaymentStatusRecord::pending(self.clock.now());
        link.invoice_number = Some(session.invoice_number.clone());
        link.transaction_id = Some(transaction_id.to_string());
        let keys = vec![session.invoice_number.clone(), transaction_id.to_string()];
        let record = self.statuses.merge(&keys, link).await?;

        info!(
            invoice_number = %session.invoice_number,
            %transaction_id,
            status = %record.status,
            "transaction attached to terminal session"
        );
        Ok(record)
    }

    pub async fn handle_webhook(&self, payload: RawWebhookPayload) -> Result<CorrelationOutcome> {
        self.correlator.handle(payload).await
    }

    /// Drop sessions past the configured maximum age.
    pub async fn sweep_sessions(&self) -> Result<usize> {
        self.sessions
            .sweep_expired(Duration::seconds(self.settings.session_max_age_secs as i64))
            .await
    }
}

/// `INV` followed by 12 upper-case hex characters.
pub fn generate_invoice_number() -> String {
    let suffix: String =
        Uuid::new_v4().simple().to_string().chars().take(12).collect::<String>().to_uppercase();
    format!("{INVOICE_PREFIX}{suffix}")
}
