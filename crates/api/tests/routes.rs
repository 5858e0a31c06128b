//! In-process tests for the HTTP surface.

mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::{monday, test_app, HAIRCUT, LOCATION, STYLIST};

#[tokio::test]
async fn health_reports_components() {
    let app = test_app().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_healthy"], true);
    assert_eq!(body["components"][0]["name"], "database");
    assert_eq!(body["components"][0]["message"], "in-memory");
}

#[tokio::test]
async fn slots_and_dates_are_listed() {
    let app = test_app().await;

    let (status, slots) = app
        .get(&format!(
            "/availability/slots?location_id={LOCATION}&service_id={HAIRCUT}&staff=any&date={}",
            monday()
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots[0]["label"], "9:00 AM");
    assert_eq!(slots[0]["staff_ids"], json!([STYLIST]));

    let (status, dates) = app
        .get(&format!("/availability/dates?location_id={LOCATION}&service_id={HAIRCUT}&date=2025-03-01"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dates[0], monday().to_string());
}

#[tokio::test]
async fn invalid_queries_are_bad_requests() {
    let app = test_app().await;

    let (status, body) =
        app.get(&format!("/availability/slots?location_id={LOCATION}&service_id={HAIRCUT}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
    assert_eq!(body["error"], "please check the booking details and try again");

    let (status, _) = app
        .get(&format!("/availability/slots?location_id={LOCATION}&service_id={HAIRCUT}&staff=someone&date=2025-03-03"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_booking_for_a_slot_conflicts() {
    let app = test_app().await;
    let request = json!({
        "staff": "any",
        "service_id": HAIRCUT,
        "location_id": LOCATION,
        "date": monday(),
        "time": "10:00",
        "client_id": 12
    });

    let (status, appointment) = app.post("/bookings", request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(appointment["staff_id"], STYLIST);
    assert_eq!(appointment["status"], "confirmed");

    let (status, body) = app.post("/bookings", request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "that time was just taken, please choose another");
}

#[tokio::test]
async fn terminal_payment_completes_through_webhook() {
    let app = test_app().await;

    let (status, started) = app
        .post("/terminal/payments", json!({ "location_id": LOCATION, "total_amount": 55.0, "base_amount": 50.0 }))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(started["status"], "pending");
    let invoice = started["invoice_number"].as_str().unwrap().to_string();
    assert_eq!(app.gateway.purchases.lock().await[0].device_code, "DEV-A");

    let (status, ack) = app
        .post(
            "/webhooks/terminal",
            json!({ "invoiceNumber": invoice, "transactionId": "tx-1", "status": "APPROVED", "amount": 55.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "received": true, "matched_by": "invoice", "status": "completed" }));

    let (status, record) = app.get("/terminal/payments/tx-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "completed");
    assert_eq!(record["invoice_number"], invoice.as_str());
    assert_eq!(record["tip_amount"], 5.0);
}

#[tokio::test]
async fn webhook_always_acknowledges() {
    let app = test_app().await;

    let (status, ack) = app.post_raw("/webhooks/terminal", "not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "received": true }));

    let (status, ack) = app.post("/webhooks/terminal", json!({ "status": "APPROVED" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["received"], true);
}

#[tokio::test]
async fn transaction_can_be_attached_to_an_invoice() {
    let app = test_app().await;
    app.post(
        "/terminal/payments",
        json!({ "location_id": LOCATION, "total_amount": 30.0, "invoice_number": "POS-1" }),
    )
    .await;

    let (status, record) =
        app.post("/terminal/payments/POS-1/transaction", json!({ "transaction_id": "tx-7" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["transaction_id"], "tx-7");
    assert_eq!(record["status"], "pending");

    let (status, _) =
        app.post("/terminal/payments/POS-404/transaction", json!({ "transaction_id": "tx-8" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/terminal/payments/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}
