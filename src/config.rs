//! Runtime configuration loaded from the environment

use std::env;

const DEFAULT_CURRENCY: &str = "ETB";
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 15;

/// Process configuration, read once at startup and passed by value into the
/// components that need it. No module-level globals.
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub chapa_secret_key: String,
    pub chapa_base_url: String,
    /// Browser redirect target after checkout completes.
    pub frontend_payment_redirect: String,
    /// Public base URL of this server, used to build the verify callback.
    pub public_base_url: String,
    /// Single currency all gateway transactions are denominated in.
    pub payment_currency: String,
    pub gateway_timeout_secs: u64,
    /// Optional HTTP mail relay; confirmation emails are logged when unset.
    pub mail_relay_url: Option<String>,
    /// Comma-separated origin list for the CORS layer.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            database_url: env::var("DATABASE_URL").unwrap_or_default(),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),
            chapa_secret_key: env::var("CHAPA_SECRET_KEY").unwrap_or_default(),
            chapa_base_url: env::var("CHAPA_BASE_URL")
                .unwrap_or_else(|_| "https://api.chapa.co/v1".to_string()),
            frontend_payment_redirect: env::var("FRONTEND_PAYMENT_REDIRECT").unwrap_or_default(),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            payment_currency: env::var("PAYMENT_CURRENCY")
                .unwrap_or_else(|_| DEFAULT_CURRENCY.to_string()),
            gateway_timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_GATEWAY_TIMEOUT_SECS),
            mail_relay_url: env::var("MAIL_RELAY_URL").ok().filter(|v| !v.is_empty()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        }
    }

    /// Callback URL the gateway hits after the payer finishes checkout.
    pub fn verify_callback_url(&self) -> String {
        format!("{}/api/payments/verify", self.public_base_url.trim_end_matches('/'))
    }
}
