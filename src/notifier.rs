//! Fire-and-forget booking confirmation dispatch
//!
//! Delivery runs on a spawned task so the request path never waits on the
//! mail relay. Failures are logged and dropped; no delivery guarantee.

use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct BookingNotifier {
    http: reqwest::Client,
    relay_url: Option<String>,
}

impl BookingNotifier {
    pub fn new(relay_url: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { http, relay_url }
    }

    /// Queue a confirmation email for a booking the host just confirmed.
    pub fn dispatch_confirmation(&self, to_email: String, booking_id: Uuid) {
        let http = self.http.clone();
        let relay_url = self.relay_url.clone();

        tokio::spawn(async move {
            if let Err(e) = send_confirmation(http, relay_url, &to_email, booking_id).await {
                tracing::warn!(
                    booking_id = %booking_id,
                    error = %e,
                    "booking confirmation email not delivered"
                );
            }
        });
    }
}

async fn send_confirmation(
    http: reqwest::Client,
    relay_url: Option<String>,
    to_email: &str,
    booking_id: Uuid,
) -> anyhow::Result<()> {
    let Some(relay_url) = relay_url else {
        tracing::info!(
            booking_id = %booking_id,
            to = %to_email,
            "mail relay not configured; logging confirmation instead"
        );
        return Ok(());
    };

    let message = json!({
        "to": to_email,
        "subject": "Booking Confirmation",
        "body": format!("Your booking #{} has been confirmed.", booking_id),
    });

    http.post(&relay_url)
        .json(&message)
        .send()
        .await?
        .error_for_status()?;

    tracing::info!(booking_id = %booking_id, "booking confirmation email dispatched");
    Ok(())
}
