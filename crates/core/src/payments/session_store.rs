//! In-memory terminal session registry

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use salonbook_common::time::Clock;
use salonbook_domain::constants::SESSION_MAX_AGE_MS;
use salonbook_domain::{Result, TerminalPaymentSession};
use tracing::debug;

use super::ports::TerminalSessionStore;

/// Sessions keyed by invoice number, with aliases (usually the processor's
/// transaction id) pointing back at the invoice.
pub struct InMemorySessionStore {
    sessions: DashMap<String, TerminalPaymentSession>,
    aliases: DashMap<String, String>,
    clock: Arc<dyn Clock>,
    max_age: Duration,
}

impl InMemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            aliases: DashMap::new(),
            clock,
            max_age: Duration::milliseconds(SESSION_MAX_AGE_MS as i64),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn resolve_key(&self, key: &str) -> Option<String> {
        if self.sessions.contains_key(key) {
            return Some(key.to_string());
        }
        self.aliases.get(key).map(|invoice| invoice.value().clone())
    }

    fn sweep_older_than(&self, max_age: Duration) -> usize {
        let cutoff = self.clock.now() - max_age;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.started_at >= cutoff);
        self.aliases.retain(|_, invoice| self.sessions.contains_key(invoice.as_str()));
        before.saturating_sub(self.sessions.len())
    }
}

#[async_trait]
impl TerminalSessionStore for InMemorySessionStore {
    async fn put(&self, session: TerminalPaymentSession) -> Result<()> {
        let swept = self.sweep_older_than(self.max_age);
        if swept > 0 {
            debug!(swept, "expired terminal sessions removed");
        }
        self.sessions.insert(session.invoice_number.clone(), session);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<TerminalPaymentSession>> {
        Ok(self
            .resolve_key(key)
            .and_then(|invoice| self.sessions.get(&invoice).map(|entry| entry.value().clone())))
    }

    async fn link_alias(&self, alias: &str, existing_key: &str) -> Result<bool> {
        let Some(invoice) = self.resolve_key(existing_key) else {
            return Ok(false);
        };
        if alias != invoice {
            self.aliases.insert(alias.to_string(), invoice);
        }
        Ok(true)
    }

    async fn recent(&self, since: DateTime<Utc>) -> Result<Vec<TerminalPaymentSession>> {
        let mut sessions: Vec<TerminalPaymentSession> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().started_at >= since)
            .map(|entry| entry.value().clone())
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions)
    }

    async fn sweep_expired(&self, max_age: Duration) -> Result<usize> {
        Ok(self.sweep_older_than(max_age))
    }
}
