//! Payment processor webhook payload
//!
//! Processors and terminal firmware versions disagree on field names, so the
//! payload is read from arbitrary JSON by probing a list of candidate names.
//! Top-level fields win over the same field nested under `data`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const INVOICE_FIELDS: &[&str] =
    &["invoiceNumber", "invoice_number", "invoice", "merchantInvoiceNumber"];
const TRANSACTION_FIELDS: &[&str] =
    &["transactionId", "transaction_id", "cardTransactionId", "txId", "id"];
const LAST4_FIELDS: &[&str] = &["last4", "cardLast4", "card_last4", "cardNumber"];
const AMOUNT_FIELDS: &[&str] = &["amount", "totalAmount", "total_amount", "transactionAmount"];
const STATUS_FIELDS: &[&str] = &["status", "transactionStatus"];
const TYPE_FIELDS: &[&str] = &["type", "eventType", "event_type", "event"];
const APPROVED_FIELDS: &[&str] = &["approved", "isApproved"];

/// Identifiers and raw outcome fields extracted from a webhook body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawWebhookPayload {
    pub invoice_number: Option<String>,
    pub transaction_id: Option<String>,
    pub last4: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub event_type: Option<String>,
    pub approved: Option<bool>,
}

impl From<Value> for RawWebhookPayload {
    fn from(value: Value) -> Self {
        let nested = value.get("data").filter(|data| data.is_object());
        let probe = |fields: &[&str]| probe_field(&value, nested, fields);

        Self {
            invoice_number: probe(INVOICE_FIELDS).and_then(as_text),
            transaction_id: probe(TRANSACTION_FIELDS).and_then(as_text),
            last4: probe(LAST4_FIELDS).and_then(as_text).and_then(|raw| last_four_digits(&raw)),
            amount: probe(AMOUNT_FIELDS).and_then(as_amount),
            status: probe(STATUS_FIELDS).and_then(as_text),
            event_type: probe(TYPE_FIELDS).and_then(as_text),
            approved: probe(APPROVED_FIELDS).and_then(as_flag),
        }
    }
}

fn probe_field<'a>(
    value: &'a Value,
    nested: Option<&'a Value>,
    fields: &[&str],
) -> Option<&'a Value> {
    find_field(value, fields).or_else(|| nested.and_then(|data| find_field(data, fields)))
}

fn find_field<'a>(value: &'a Value, fields: &[&str]) -> Option<&'a Value> {
    fields.iter().filter_map(|name| value.get(*name)).find(|v| !v.is_null())
}

fn as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn as_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    };
    amount.filter(|amount: &f64| amount.is_finite())
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "approved" => Some(true),
            "false" | "no" | "0" | "declined" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Masked card numbers (`5454********5454`) keep only their last four digits.
fn last_four_digits(raw: &str) -> Option<String> {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return None;
    }
    Some(digits[digits.len() - 4..].iter().collect())
}
