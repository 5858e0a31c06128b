//! End-to-end coverage for the SQLite repositories against the real schema,
//! including a full booking commit through `BookingService`.

mod support;

use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use salonbook_common::time::MockClock;
use salonbook_core::availability::ports::{
    AppointmentRepository, AppointmentWriter, ScheduleRepository, ServiceCatalog,
    StaffEligibility,
};
use salonbook_core::payments::ports::PaymentStatusCache;
use salonbook_core::{BookingPorts, BookingService, BusinessClock, SlotQuery};
use salonbook_domain::{
    AppointmentStatus, BookingRequest, NewAppointment, PaymentStatus, PaymentStatusRecord,
    SalonError, Service, ServiceSelection, StaffSelector,
};
use salonbook_infra::database::{
    SqliteAppointmentStore, SqlitePaymentStatusCache, SqliteScheduleRepository,
    SqliteServiceCatalog, SqliteStaffEligibility,
};
use support::{service, weekday_shift, TestDatabase};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

#[tokio::test]
async fn catalog_filters_by_location_and_keeps_add_on_links() {
    let db = TestDatabase::new();
    let catalog = SqliteServiceCatalog::new(db.manager.clone());

    catalog.upsert(service(1, 60), None).await.unwrap();
    catalog.upsert(service(2, 30), Some(2)).await.unwrap();
    catalog
        .upsert(Service { is_add_on: true, base_service_ids: vec![1], ..service(3, 15) }, None)
        .await
        .unwrap();

    let at_one = catalog.services_for_location(1).await.unwrap();
    let ids: Vec<_> = at_one.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(at_one[1].base_service_ids, vec![1]);
    assert!(at_one[1].is_add_on);

    assert_eq!(catalog.services_for_location(2).await.unwrap().len(), 3);
}

#[tokio::test]
async fn eligibility_and_schedules_round_trip() {
    let db = TestDatabase::new();
    let eligibility = SqliteStaffEligibility::new(db.manager.clone());
    let schedules = SqliteScheduleRepository::new(db.manager.clone());

    eligibility.assign(7, 1, None).await.unwrap();
    eligibility.assign(4, 1, Some(1)).await.unwrap();
    eligibility.assign(4, 1, Some(1)).await.unwrap();
    eligibility.assign(9, 1, Some(2)).await.unwrap();
    assert_eq!(eligibility.staff_for_service(1, 1).await.unwrap(), vec![4, 7]);

    let mut blocked = weekday_shift(4, Some(1), "Monday");
    blocked.start_time = "12:00".into();
    blocked.end_time = "13:00".into();
    blocked.is_blocked = true;
    blocked.end_date = NaiveDate::from_ymd_opt(2025, 6, 30);
    schedules.add(weekday_shift(4, Some(1), "Monday")).await.unwrap();
    schedules.add(blocked.clone()).await.unwrap();
    schedules.add(weekday_shift(9, Some(2), "Monday")).await.unwrap();

    let rows = schedules.schedules_for_location(1).await.unwrap();
    assert_eq!(rows.len(), 2);
    let stored_block = rows.iter().find(|row| row.is_blocked).unwrap();
    assert_eq!(stored_block.end_date, blocked.end_date);
    assert_eq!(stored_block.start_date, blocked.start_date);
}

#[tokio::test]
async fn appointments_are_queried_half_open() {
    let db = TestDatabase::new();
    let store = SqliteAppointmentStore::new(db.manager.clone());
    let nine = Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap();

    let created = store
        .create_appointment(NewAppointment {
            staff_id: 4,
            client_id: Some(1),
            service_id: 1,
            add_on_ids: vec![3],
            location_id: 1,
            start_time: nine,
            end_time: nine + Duration::minutes(75),
            status: AppointmentStatus::Confirmed,
            notes: Some("first visit".into()),
        })
        .await
        .unwrap();
    assert!(created.id > 0);

    let found = store.appointments_between(nine, nine + Duration::hours(1)).await.unwrap();
    assert_eq!(found, vec![created]);
    assert!(store.appointments_between(nine - Duration::hours(1), nine).await.unwrap().is_empty());
}

#[tokio::test]
async fn payment_status_merge_is_monotonic_and_multi_keyed() {
    let db = TestDatabase::new();
    let cache = SqlitePaymentStatusCache::new(db.manager.clone());
    let now = Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap();

    let mut pending = PaymentStatusRecord::pending(now);
    pending.invoice_number = Some("INV1".into());
    pending.base_amount = Some(45.0);
    cache.merge(&["INV1".into()], pending.clone()).await.unwrap();

    let mut approved = PaymentStatusRecord::pending(now + Duration::seconds(20));
    approved.status = PaymentStatus::Completed;
    approved.invoice_number = Some("INV1".into());
    approved.transaction_id = Some("tx-1".into());
    approved.amount = Some(50.0);
    approved.tip_amount = Some(5.0);
    let merged = cache.merge(&["INV1".into()], approved).await.unwrap();
    assert_eq!(merged.status, PaymentStatus::Completed);
    assert_eq!(merged.base_amount, Some(45.0));

    // A late pending write cannot reopen the payment.
    let stale = cache.merge(&["tx-1".into()], PaymentStatusRecord::pending(now)).await.unwrap();
    assert_eq!(stale.status, PaymentStatus::Completed);

    let by_tx = cache.get("tx-1").await.unwrap().unwrap();
    assert_eq!(by_tx, cache.get("INV1").await.unwrap().unwrap());
    assert_eq!(by_tx.tip_amount, Some(5.0));
    assert!(cache.get("INV404").await.unwrap().is_none());
}

#[tokio::test]
async fn booking_service_commits_through_sqlite() {
    let db = TestDatabase::new();
    let catalog = Arc::new(SqliteServiceCatalog::new(db.manager.clone()));
    let eligibility = Arc::new(SqliteStaffEligibility::new(db.manager.clone()));
    let schedules = Arc::new(SqliteScheduleRepository::new(db.manager.clone()));
    let appointments = Arc::new(SqliteAppointmentStore::new(db.manager.clone()));

    catalog.upsert(service(1, 60), None).await.unwrap();
    eligibility.assign(4, 1, None).await.unwrap();
    schedules.add(weekday_shift(4, Some(1), "Monday")).await.unwrap();

    let booking = BookingService::new(
        BookingPorts {
            catalog,
            eligibility,
            schedules,
            appointments: appointments.clone(),
            writer: appointments,
        },
        BusinessClock::default(),
    )
    .with_time_source(Arc::new(MockClock::at(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())));

    let request = BookingRequest {
        staff: StaffSelector::Any,
        service_id: Some(1),
        add_on_ids: Vec::new(),
        location_id: Some(1),
        date: Some(monday()),
        time: Some("09:00".into()),
        client_id: Some(5),
        notes: None,
    };
    let appointment = booking.commit_booking(request.clone()).await.unwrap();
    assert_eq!(appointment.staff_id, 4);
    assert!(matches!(
        booking.commit_booking(request).await,
        Err(SalonError::SlotNoLongerAvailable { .. })
    ));

    let query = SlotQuery {
        staff: StaffSelector::Any,
        selection: ServiceSelection::single(1),
        location_id: 1,
    };
    let slots = booking.available_slots(&query, monday()).await.unwrap();
    assert_eq!(slots.first().map(|slot| slot.label.as_str()), Some("10:00 AM"));
}
