//! Payment processor client
//!
//! Implements the enrichment lookup and the terminal purchase push on top of
//! the shared [`HttpClient`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, Response};
use salonbook_common::error::CommonError;
use salonbook_core::payments::ports::{
    EnrichedTransaction, PaymentEnricher, TerminalGateway, TerminalPurchase,
};
use salonbook_domain::{Result, SalonError, TerminalConfig};
use tracing::{debug, info};

use super::errors::HelcimError;
use super::types::{CardTransaction, PurchaseRequest};
use crate::http::HttpClient;

const TOKEN_HEADER: &str = "api-token";
const IDEMPOTENCY_HEADER: &str = "idempotency-key";
const CURRENCY: &str = "USD";

pub struct HelcimClient {
    http: HttpClient,
    base_url: String,
    api_token: Option<String>,
}

impl HelcimClient {
    pub fn new(settings: &TerminalConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = HttpClient::builder().default_headers(headers).build()?;
        Ok(Self::with_http(http, settings))
    }

    pub fn with_http(http: HttpClient, settings: &TerminalConfig) -> Self {
        Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_token: settings.api_token.clone().filter(|token| !token.is_empty()),
        }
    }

    fn token(&self) -> std::result::Result<&str, HelcimError> {
        self.api_token.as_deref().ok_or(HelcimError::MissingToken)
    }

    pub async fn card_transaction(
        &self,
        transaction_id: &str,
    ) -> std::result::Result<CardTransaction, HelcimError> {
        let url = format!("{}/card-transactions/{transaction_id}", self.base_url);
        let request = self.http.request(Method::GET, url).header(TOKEN_HEADER, self.token()?);
        let response = self.http.send(request).await.map_err(transport_error)?;
        let response = require_success(response, transaction_id).await?;

        response
            .json::<CardTransaction>()
            .await
            .map_err(|err| HelcimError::Common(CommonError::serialization_format("JSON", err.to_string())))
    }

    pub async fn purchase(&self, purchase: &TerminalPurchase) -> std::result::Result<(), HelcimError> {
        let url = format!("{}/devices/{}/payment/purchase", self.base_url, purchase.device_code);
        let body = PurchaseRequest {
            currency: CURRENCY,
            transaction_amount: purchase.amount,
            invoice_number: &purchase.invoice_number,
        };
        // Retries are safe: the processor dedupes on the idempotency key.
        let request = self
            .http
            .request(Method::POST, url)
            .header(TOKEN_HEADER, self.token()?)
            .header(IDEMPOTENCY_HEADER, &purchase.invoice_number)
            .json(&body);
        let response = self.http.send(request).await.map_err(transport_error)?;
        require_success(response, &purchase.invoice_number).await?;
        Ok(())
    }
}

#[async_trait]
impl PaymentEnricher for HelcimClient {
    async fn fetch_transaction(&self, transaction_id: &str) -> Result<EnrichedTransaction> {
        let transaction =
            self.card_transaction(transaction_id).await.map_err(HelcimError::into_enrichment_error)?;
        debug!(%transaction_id, status = ?transaction.status, "card transaction fetched");

        Ok(EnrichedTransaction {
            transaction_id: transaction.transaction_id().unwrap_or_else(|| transaction_id.to_string()),
            last4: transaction.last4(),
            invoice_number: transaction.invoice_number.filter(|invoice| !invoice.is_empty()),
            status: transaction.status,
            amount: transaction.amount,
        })
    }
}

#[async_trait]
impl TerminalGateway for HelcimClient {
    async fn start_purchase(&self, purchase: &TerminalPurchase) -> Result<()> {
        self.purchase(purchase).await.map_err(HelcimError::into_domain_error)?;
        info!(
            device_code = %purchase.device_code,
            invoice_number = %purchase.invoice_number,
            amount = purchase.amount,
            "purchase pushed to terminal"
        );
        Ok(())
    }
}

async fn require_success(response: Response, subject: &str) -> std::result::Result<Response, HelcimError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(HelcimError::from_response(status, body, subject))
}

fn transport_error(err: SalonError) -> HelcimError {
    let retryable = err.is_retryable();
    HelcimError::Common(CommonError::backend("helcim", err.to_string(), retryable))
}
