//! Tracing subscriber setup and request logging helpers

use std::time::Duration;

use salonbook_domain::{LoggingConfig, SalonError};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `config.level`. Returns an error if a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }
    Ok(())
}

/// Log the outcome of a request handler with structured fields.
///
/// Callers must avoid forwarding sensitive values in `route`.
#[inline]
pub fn log_request_outcome(route: &str, elapsed: Duration, outcome: Result<(), &SalonError>) {
    let duration_ms = elapsed.as_millis() as u64;

    match outcome {
        Ok(()) => info!(route, duration_ms, "request_success"),
        Err(err) => warn!(route, duration_ms, error_type = err.label(), error = %err, "request_failure"),
    }
}
