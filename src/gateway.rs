//! Payment gateway client (Chapa)
//!
//! The coordinator talks to the gateway through the [`PaymentGateway`]
//! trait so tests can substitute a fake. The production client carries its
//! base URL, bearer secret, and a bounded request timeout as explicit
//! constructor state.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Gateway failures. `Declined` carries the provider's raw response body so
/// it can be passed through to the caller unmodified.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway declined the transaction")]
    Declined(serde_json::Value),

    #[error("gateway request timed out")]
    Timeout,

    #[error("gateway transport error: {0}")]
    Transport(String),

    #[error("gateway returned a malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Raw provider detail for the API error body.
    pub fn detail(&self) -> serde_json::Value {
        match self {
            Self::Declined(body) => body.clone(),
            other => json!({ "message": other.to_string() }),
        }
    }
}

/// Everything the initialize call sends. Both payment entry points (booking
/// creation and standalone initiate) build this same shape.
#[derive(Debug, Clone, Serialize)]
pub struct InitializePayment {
    pub amount: Decimal,
    pub currency: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tx_ref: String,
    pub callback_url: String,
    pub return_url: String,
}

/// What a successful initialize hands back.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub checkout_url: String,
    /// Gateway-assigned transaction id; absent in some provider responses.
    pub transaction_id: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Single attempt, fail-fast: no retries on decline or timeout.
    async fn initialize(&self, request: InitializePayment) -> Result<CheckoutSession, GatewayError>;

    /// Ask the gateway whether the transaction behind `tx_ref` succeeded.
    async fn verify(&self, tx_ref: &str) -> Result<bool, GatewayError>;
}

// ===== Chapa wire format =====

#[derive(Debug, Deserialize)]
struct ChapaResponse {
    status: Option<String>,
    data: Option<ChapaData>,
}

#[derive(Debug, Deserialize)]
struct ChapaData {
    checkout_url: Option<String>,
    id: Option<String>,
    tx_ref: Option<String>,
}

fn parse_initialize_response(body: serde_json::Value) -> Result<CheckoutSession, GatewayError> {
    let parsed: ChapaResponse = serde_json::from_value(body.clone())
        .map_err(|e| GatewayError::Malformed(e.to_string()))?;

    if parsed.status.as_deref() != Some("success") {
        return Err(GatewayError::Declined(body));
    }

    let data = parsed
        .data
        .ok_or_else(|| GatewayError::Malformed("missing data object".to_string()))?;
    let checkout_url = data
        .checkout_url
        .ok_or_else(|| GatewayError::Malformed("missing checkout_url".to_string()))?;

    Ok(CheckoutSession {
        checkout_url,
        transaction_id: data.id.or(data.tx_ref),
    })
}

fn parse_verify_response(body: serde_json::Value) -> Result<bool, GatewayError> {
    let parsed: ChapaResponse =
        serde_json::from_value(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;
    Ok(parsed.status.as_deref() == Some("success"))
}

/// Production Chapa client.
pub struct ChapaGateway {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl ChapaGateway {
    pub fn new(base_url: String, secret_key: String, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    fn classify(err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl PaymentGateway for ChapaGateway {
    async fn initialize(&self, request: InitializePayment) -> Result<CheckoutSession, GatewayError> {
        tracing::info!(tx_ref = %request.tx_ref, "initializing gateway transaction");

        let body = json!({
            "amount": request.amount.to_string(),
            "currency": request.currency,
            "email": request.email,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "tx_ref": request.tx_ref,
            "callback_url": request.callback_url,
            "return_url": request.return_url,
        });

        let response = self
            .http
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::classify)?
            .json::<serde_json::Value>()
            .await
            .map_err(Self::classify)?;

        parse_initialize_response(response)
    }

    async fn verify(&self, tx_ref: &str) -> Result<bool, GatewayError> {
        tracing::info!(tx_ref = %tx_ref, "verifying gateway transaction");

        let response = self
            .http
            .get(format!("{}/transaction/verify/{}", self.base_url, tx_ref))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(Self::classify)?
            .json::<serde_json::Value>()
            .await
            .map_err(Self::classify)?;

        parse_verify_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_initialize_parses_checkout_url() {
        let session = parse_initialize_response(json!({
            "status": "success",
            "data": { "checkout_url": "https://pay.example/abc", "id": "tx-123" }
        }))
        .unwrap();
        assert_eq!(session.checkout_url, "https://pay.example/abc");
        assert_eq!(session.transaction_id.as_deref(), Some("tx-123"));
    }

    #[test]
    fn initialize_falls_back_to_tx_ref_when_id_missing() {
        let session = parse_initialize_response(json!({
            "status": "success",
            "data": { "checkout_url": "https://pay.example/abc", "tx_ref": "ref-9" }
        }))
        .unwrap();
        assert_eq!(session.transaction_id.as_deref(), Some("ref-9"));
    }

    #[test]
    fn declined_initialize_carries_raw_body() {
        let body = json!({ "status": "failed", "message": "Invalid currency" });
        let err = parse_initialize_response(body.clone()).unwrap_err();
        match err {
            GatewayError::Declined(detail) => assert_eq!(detail, body),
            other => panic!("expected Declined, got {:?}", other),
        }
    }

    #[test]
    fn verify_maps_status_to_bool() {
        assert!(parse_verify_response(json!({ "status": "success" })).unwrap());
        assert!(!parse_verify_response(json!({ "status": "failed" })).unwrap());
        assert!(!parse_verify_response(json!({ "message": "no status" })).unwrap());
    }
}
