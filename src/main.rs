//! StayHub Backend Server
//!
//! Main entry point for the StayHub backend: a property-rental marketplace
//! API with listings, bookings, reviews, and payment processing through an
//! external gateway.

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use stayhub_server::app_state::AppState;
use stayhub_server::booking_service::BookingService;
use stayhub_server::config::Config;
use stayhub_server::gateway::ChapaGateway;
use stayhub_server::listing_service::ListingService;
use stayhub_server::notifier::BookingNotifier;
use stayhub_server::payment_service::PaymentService;
use stayhub_server::review_service::ReviewService;
use stayhub_server::routes;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations");

    let gateway = Arc::new(ChapaGateway::new(
        config.chapa_base_url.clone(),
        config.chapa_secret_key.clone(),
        Duration::from_secs(config.gateway_timeout_secs),
    ));
    let notifier = Arc::new(BookingNotifier::new(config.mail_relay_url.clone()));

    let app_state = AppState::new(
        Arc::new(ListingService::new(db_pool.clone())),
        Arc::new(BookingService::new(db_pool.clone(), notifier)),
        Arc::new(ReviewService::new(db_pool.clone())),
        Arc::new(PaymentService::new(
            db_pool,
            gateway,
            config.payment_currency.clone(),
            config.verify_callback_url(),
            config.frontend_payment_redirect.clone(),
        )),
        config.jwt_secret.clone(),
    );

    // Create the app router
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(routes::listing_routes())
        .merge(routes::booking_routes())
        .merge(routes::review_routes())
        .merge(routes::payment_routes())
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.cors_allowed_origins))
        .with_state(app_state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    tracing::info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}

async fn root() -> &'static str {
    "StayHub API Server"
}

async fn health_check() -> &'static str {
    "OK"
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(false)
}
