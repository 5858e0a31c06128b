//! Payment processor wire types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Card transaction as returned by `GET /card-transactions/{id}`.
///
/// Only the fields used for enrichment are modelled; ids arrive as numbers or
/// strings depending on the endpoint version.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTransaction {
    #[serde(default)]
    pub transaction_id: Option<Value>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    /// Masked PAN, e.g. `424242******4242`.
    #[serde(default)]
    pub card_number: Option<String>,
}

impl CardTransaction {
    pub fn last4(&self) -> Option<String> {
        let digits: String = self.card_number.as_deref()?.chars().filter(char::is_ascii_digit).collect();
        (digits.len() >= 4).then(|| digits[digits.len() - 4..].to_string())
    }

    pub fn transaction_id(&self) -> Option<String> {
        match self.transaction_id.as_ref()? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Body of `POST /devices/{code}/payment/purchase`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest<'a> {
    pub currency: &'a str,
    pub transaction_amount: f64,
    pub invoice_number: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last4_comes_from_masked_card_number() {
        let tx: CardTransaction = serde_json::from_value(serde_json::json!({
            "transactionId": 25764674,
            "cardNumber": "5454********5454",
            "status": "APPROVED"
        }))
        .unwrap();

        assert_eq!(tx.last4().as_deref(), Some("5454"));
        assert_eq!(tx.transaction_id().as_deref(), Some("25764674"));
    }
}
