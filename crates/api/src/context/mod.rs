//! Application context - dependency injection container

use std::sync::Arc;

use salonbook_common::time::{Clock, SystemClock};
use salonbook_core::availability::memory::{
    InMemoryAppointmentStore, InMemoryScheduleRepository, InMemoryServiceCatalog,
    InMemoryStaffEligibility,
};
use salonbook_core::payments::ports::PaymentStatusCache;
use salonbook_core::{
    BookingPorts, BookingService, BusinessClock, InMemoryPaymentStatusCache, PaymentPorts,
    TerminalPaymentService,
};
use salonbook_domain::{Config, Result};
use salonbook_infra::config::{load_fixtures, SalonFixtures};
use salonbook_infra::{
    DbManager, HelcimClient, MokaSessionStore, SqliteAppointmentStore, SqlitePaymentStatusCache,
    SqliteScheduleRepository, SqliteServiceCatalog, SqliteStaffEligibility,
};
use tracing::info;

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies
pub struct AppContext {
    /// Configuration the context was built from.
    pub config: Config,
    /// `None` when the stores are in-memory.
    pub db: Option<Arc<DbManager>>,
    /// Availability queries and booking commits.
    pub booking: Arc<BookingService>,
    /// Terminal purchases, status polling and webhook correlation.
    pub payments: Arc<TerminalPaymentService>,
}

impl AppContext {
    /// Wire the production adapters described by `config`.
    pub fn new(config: Config) -> Result<Self> {
        let business_clock = BusinessClock::from_name(&config.business.timezone)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let (db, booking_ports, statuses) = if config.database.is_in_memory() {
            let fixtures = match &config.database.fixtures {
                Some(path) => load_fixtures(path)?,
                None => SalonFixtures::default(),
            };
            info!(
                seeded = config.database.fixtures.is_some(),
                "database path empty, using in-memory stores"
            );
            let (ports, statuses) = in_memory_stores(fixtures);
            (None, ports, statuses)
        } else {
            let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
            db.run_migrations()?;
            let (ports, statuses) = sqlite_stores(&db);
            (Some(db), ports, statuses)
        };

        let helcim = Arc::new(HelcimClient::new(&config.terminal)?);
        let payment_ports = PaymentPorts {
            sessions: Arc::new(MokaSessionStore::new(clock.clone())),
            statuses,
            gateway: helcim.clone(),
            enricher: Some(helcim),
        };

        let booking = BookingService::new(booking_ports, business_clock)
            .with_time_source(clock.clone())
            .with_window_days(config.booking.window_days);
        let payments = TerminalPaymentService::with_clock(payment_ports, config.terminal.clone(), clock);

        info!(
            timezone = %config.business.timezone,
            window_days = config.booking.window_days,
            persistent = db.is_some(),
            "application context initialised"
        );

        Ok(Self { config, db, booking: Arc::new(booking), payments: Arc::new(payments) })
    }

    /// Assemble a context from already-built services.
    pub fn from_services(
        config: Config,
        booking: Arc<BookingService>,
        payments: Arc<TerminalPaymentService>,
    ) -> Self {
        Self { config, db: None, booking, payments }
    }

    /// Database reachability and payment terminal credentials.
    pub fn health(&self) -> HealthStatus {
        let database = match &self.db {
            Some(db) => match db.health_check() {
                Ok(()) => ComponentHealth::healthy("database"),
                Err(err) => ComponentHealth::unhealthy("database", err.to_string()),
            },
            None => ComponentHealth::healthy("database").with_message("in-memory"),
        };
        let terminal = if self.config.terminal.api_token.is_some() {
            ComponentHealth::healthy("payment_terminal")
        } else {
            ComponentHealth::unhealthy("payment_terminal", "api token not configured")
        };

        let mut status = HealthStatus::new().add_component(database).add_component(terminal);
        status.calculate_score();
        status
    }
}

/// Without a fixture file every store starts empty, so nothing is bookable
/// until data is added.
fn in_memory_stores(fixtures: SalonFixtures) -> (BookingPorts, Arc<dyn PaymentStatusCache>) {
    let appointments = Arc::new(InMemoryAppointmentStore::new(fixtures.appointments));
    let ports = BookingPorts {
        catalog: Arc::new(InMemoryServiceCatalog::new(fixtures.services)),
        eligibility: Arc::new(InMemoryStaffEligibility::with_assignments(fixtures.assignments)),
        schedules: Arc::new(InMemoryScheduleRepository::new(fixtures.schedules)),
        appointments: appointments.clone(),
        writer: appointments,
    };
    (ports, Arc::new(InMemoryPaymentStatusCache::new()))
}

fn sqlite_stores(db: &Arc<DbManager>) -> (BookingPorts, Arc<dyn PaymentStatusCache>) {
    let appointments = Arc::new(SqliteAppointmentStore::new(db.clone()));
    let ports = BookingPorts {
        catalog: Arc::new(SqliteServiceCatalog::new(db.clone())),
        eligibility: Arc::new(SqliteStaffEligibility::new(db.clone())),
        schedules: Arc::new(SqliteScheduleRepository::new(db.clone())),
        appointments: appointments.clone(),
        writer: appointments,
    };
    (ports, Arc::new(SqlitePaymentStatusCache::new(db.clone())))
}
