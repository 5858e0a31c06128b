#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, TimeZone, Utc};
use salonbook_api::{router, AppContext};
use salonbook_common::time::MockClock;
use salonbook_core::availability::memory::{
    InMemoryAppointmentStore, InMemoryScheduleRepository, InMemoryServiceCatalog,
    InMemoryStaffEligibility,
};
use salonbook_core::payments::ports::{TerminalGateway, TerminalPurchase};
use salonbook_core::{
    BookingPorts, BookingService, BusinessClock, InMemoryPaymentStatusCache, InMemorySessionStore,
    PaymentPorts, TerminalPaymentService,
};
use salonbook_domain::{Config, Result, Service, StaffSchedule, TerminalConfig};
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const LOCATION: i64 = 1;
pub const HAIRCUT: i64 = 1;
pub const STYLIST: i64 = 4;

/// Gateway that records every purchase instead of calling a terminal.
#[derive(Default)]
pub struct RecordingGateway {
    pub purchases: Mutex<Vec<TerminalPurchase>>,
}

#[async_trait]
impl TerminalGateway for RecordingGateway {
    async fn start_purchase(&self, purchase: &TerminalPurchase) -> Result<()> {
        self.purchases.lock().await.push(purchase.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<RecordingGateway>,
    pub clock: MockClock,
}

pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date")
}

/// App over in-memory stores: one stylist working Mondays 09:00-17:00 and a
/// terminal configured for the location. The clock sits on the Saturday
/// before.
pub async fn test_app() -> TestApp {
    let clock = MockClock::at(Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap());
    let gateway = Arc::new(RecordingGateway::default());

    let haircut = Service {
        id: HAIRCUT,
        name: "Haircut".into(),
        duration: 60,
        buffer_time_before: 0,
        buffer_time_after: 0,
        price: 55.0,
        category_id: None,
        is_add_on: false,
        base_service_ids: Vec::new(),
    };
    let shift = StaffSchedule {
        id: 1,
        staff_id: STYLIST,
        location_id: Some(LOCATION),
        day_of_week: "Monday".into(),
        start_time: "09:00".into(),
        end_time: "17:00".into(),
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: None,
        is_blocked: false,
    };
    let eligibility = InMemoryStaffEligibility::new();
    eligibility.assign(HAIRCUT, STYLIST).await;

    let appointments = Arc::new(InMemoryAppointmentStore::default());
    let booking = BookingService::new(
        BookingPorts {
            catalog: Arc::new(InMemoryServiceCatalog::new(vec![haircut])),
            eligibility: Arc::new(eligibility),
            schedules: Arc::new(InMemoryScheduleRepository::new(vec![shift])),
            appointments: appointments.clone(),
            writer: appointments,
        },
        BusinessClock::default(),
    )
    .with_time_source(Arc::new(clock.clone()));

    let terminal = TerminalConfig {
        api_token: Some("test-token".into()),
        devices: HashMap::from([(LOCATION.to_string(), "DEV-A".to_string())]),
        ..TerminalConfig::default()
    };
    let payments = TerminalPaymentService::with_clock(
        PaymentPorts {
            sessions: Arc::new(InMemorySessionStore::new(Arc::new(clock.clone()))),
            statuses: Arc::new(InMemoryPaymentStatusCache::new()),
            gateway: gateway.clone(),
            enricher: None,
        },
        terminal.clone(),
        Arc::new(clock.clone()),
    );

    let config = Config { terminal, ..Config::default() };
    let ctx = AppContext::from_services(config, Arc::new(booking), Arc::new(payments));

    TestApp { router: router(Arc::new(ctx)), gateway, clock }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_raw(&self, uri: &str, body: &'static str) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }
}
