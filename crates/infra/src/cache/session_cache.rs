//! Terminal session registry on a moka TTL cache.
//!
//! Age is always measured from `started_at`, so re-putting a session (for
//! example after a transaction id is attached) never extends its life.
//! moka's TTL only bounds how long an entry can linger unread.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;
use salonbook_common::time::Clock;
use salonbook_core::payments::ports::TerminalSessionStore;
use salonbook_domain::constants::SESSION_MAX_AGE_MS;
use salonbook_domain::{Result, TerminalPaymentSession};
use tracing::debug;

const MAX_SESSIONS: u64 = 10_000;

pub struct MokaSessionStore {
    sessions: Cache<String, TerminalPaymentSession>,
    /// alias → invoice number
    aliases: Cache<String, String>,
    clock: Arc<dyn Clock>,
    max_age: Duration,
}

impl MokaSessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, StdDuration::from_millis(SESSION_MAX_AGE_MS))
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: StdDuration) -> Self {
        let max_age = Duration::from_std(ttl)
            .unwrap_or_else(|_| Duration::milliseconds(SESSION_MAX_AGE_MS as i64));
        Self {
            sessions: Cache::builder().max_capacity(MAX_SESSIONS).time_to_live(ttl).build(),
            aliases: Cache::builder().max_capacity(MAX_SESSIONS).time_to_live(ttl).build(),
            clock,
            max_age,
        }
    }

    fn is_live(&self, session: &TerminalPaymentSession) -> bool {
        session.started_at >= self.clock.now() - self.max_age
    }

    async fn sweep_older_than(&self, max_age: Duration) -> usize {
        let cutoff = self.clock.now() - max_age;
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.started_at < cutoff)
            .map(|(invoice, _)| invoice.as_ref().clone())
            .collect();

        for invoice in &expired {
            self.sessions.invalidate(invoice).await;
        }
        let dangling: Vec<String> = self
            .aliases
            .iter()
            .filter(|(_, invoice)| expired.contains(invoice))
            .map(|(alias, _)| alias.as_ref().clone())
            .collect();
        for alias in &dangling {
            self.aliases.invalidate(alias).await;
        }
        self.sessions.run_pending_tasks().await;

        if !expired.is_empty() {
            debug!(swept = expired.len(), "expired terminal sessions removed");
        }
        expired.len()
    }

    async fn resolve_key(&self, key: &str) -> Option<String> {
        if self.sessions.contains_key(key) {
            return Some(key.to_string());
        }
        self.aliases.get(key).await
    }
}

#[async_trait]
impl TerminalSessionStore for MokaSessionStore {
    async fn put(&self, session: TerminalPaymentSession) -> Result<()> {
        self.sweep_older_than(self.max_age).await;
        self.sessions.insert(session.invoice_number.clone(), session).await;
        self.sessions.run_pending_tasks().await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<TerminalPaymentSession>> {
        let Some(invoice) = self.resolve_key(key).await else {
            return Ok(None);
        };
        Ok(self.sessions.get(&invoice).await.filter(|session| self.is_live(session)))
    }

    async fn link_alias(&self, alias: &str, existing_key: &str) -> Result<bool> {
        let Some(invoice) = self.resolve_key(existing_key).await else {
            return Ok(false);
        };
        if alias != invoice {
            self.aliases.insert(alias.to_string(), invoice).await;
        }
        Ok(true)
    }

    async fn recent(&self, since: DateTime<Utc>) -> Result<Vec<TerminalPaymentSession>> {
        let mut sessions: Vec<TerminalPaymentSession> = self
            .sessions
            .iter()
            .map(|(_, session)| session)
            .filter(|session| session.started_at >= since && self.is_live(session))
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions)
    }

    async fn sweep_expired(&self, max_age: Duration) -> Result<usize> {
        Ok(self.sweep_older_than(max_age).await)
    }
}
