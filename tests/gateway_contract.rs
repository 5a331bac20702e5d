//! The gateway seam: both payment entry points build the same call shape,
//! and gateway failures surface raw provider detail without retries.

use async_trait::async_trait;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Mutex;

use stayhub_server::gateway::{
    CheckoutSession, GatewayError, InitializePayment, PaymentGateway,
};

/// Records every call; answers with a canned script.
struct FakeGateway {
    initialize_calls: Mutex<Vec<InitializePayment>>,
    decline: bool,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn initialize(
        &self,
        request: InitializePayment,
    ) -> Result<CheckoutSession, GatewayError> {
        self.initialize_calls.lock().unwrap().push(request);
        if self.decline {
            return Err(GatewayError::Declined(json!({
                "status": "failed",
                "message": "Insufficient balance"
            })));
        }
        Ok(CheckoutSession {
            checkout_url: "https://checkout.example/session".to_string(),
            transaction_id: None,
        })
    }

    async fn verify(&self, _tx_ref: &str) -> Result<bool, GatewayError> {
        Ok(!self.decline)
    }
}

fn sample_request(tx_ref: &str) -> InitializePayment {
    InitializePayment {
        amount: dec!(300),
        currency: "ETB".to_string(),
        email: "guest@example.com".to_string(),
        first_name: "Gia".to_string(),
        last_name: "Guest".to_string(),
        tx_ref: tx_ref.to_string(),
        callback_url: "http://localhost:3001/api/payments/verify".to_string(),
        return_url: "http://localhost:3000/payment/done".to_string(),
    }
}

#[tokio::test]
async fn initialize_is_called_exactly_once_per_attempt() {
    let gateway = FakeGateway {
        initialize_calls: Mutex::new(Vec::new()),
        decline: true,
    };

    // fail-fast: one declined call, no retry
    let err = gateway.initialize(sample_request("ref-1")).await.unwrap_err();
    assert!(matches!(err, GatewayError::Declined(_)));
    assert_eq!(gateway.initialize_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn declined_initialize_surfaces_raw_provider_body() {
    let gateway = FakeGateway {
        initialize_calls: Mutex::new(Vec::new()),
        decline: true,
    };

    let err = gateway.initialize(sample_request("ref-2")).await.unwrap_err();
    let detail = err.detail();
    assert_eq!(detail["message"], "Insufficient balance");
    assert_eq!(detail["status"], "failed");
}

#[tokio::test]
async fn call_shape_carries_all_payer_and_routing_fields() {
    let gateway = FakeGateway {
        initialize_calls: Mutex::new(Vec::new()),
        decline: false,
    };

    gateway.initialize(sample_request("booking-uuid")).await.unwrap();

    let calls = gateway.initialize_calls.lock().unwrap();
    let sent = &calls[0];
    assert_eq!(sent.currency, "ETB");
    assert_eq!(sent.tx_ref, "booking-uuid");
    assert!(!sent.email.is_empty());
    assert!(!sent.callback_url.is_empty());
    assert!(!sent.return_url.is_empty());
}

#[test]
fn timeout_detail_is_structured_not_raw() {
    let detail = GatewayError::Timeout.detail();
    assert_eq!(detail["message"], "gateway request timed out");
}
