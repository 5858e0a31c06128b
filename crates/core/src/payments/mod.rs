//! Terminal payments
//!
//! Sessions are registered when a purchase is pushed to a card terminal;
//! webhooks from the processor are correlated back to them and folded into a
//! monotonic status record that polling clients read.

pub mod classifier;
pub mod correlator;
pub mod ports;
pub mod service;
pub mod session_store;
pub mod status_cache;

pub use classifier::classify;
pub use correlator::{CorrelationOutcome, MatchPath, WebhookCorrelator};
pub use ports::{
    EnrichedTransaction, PaymentEnricher, PaymentStatusCache, TerminalGateway, TerminalPurchase,
    TerminalSessionStore,
};
pub use service::{generate_invoice_number, PaymentPorts, TerminalPaymentService};
pub use session_store::InMemorySessionStore;
pub use status_cache::{merge_records, reconcile, storage_keys, InMemoryPaymentStatusCache};
