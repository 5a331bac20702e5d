//! Route definitions for the StayHub API

use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;
use crate::handlers::*;

// Listing routes (list/get public, mutations host-gated in the service)
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/api/listings", get(list_listings).post(create_listing))
        .route(
            "/api/listings/:id",
            get(get_listing)
                .put(update_listing)
                .patch(update_listing)
                .delete(delete_listing),
        )
}

// Booking routes
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route(
            "/api/bookings/:id",
            get(get_booking)
                .put(update_booking)
                .patch(update_booking)
                .delete(delete_booking),
        )
}

// Review routes, nested under their listing
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/listings/:listing_id/reviews",
            get(list_reviews).post(create_review),
        )
        .route(
            "/api/listings/:listing_id/reviews/:id",
            get(get_review).delete(delete_review),
        )
}

// Payment routes: the initiate/verify handshake plus administrative CRUD
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/payments/initiate", post(initiate_payment))
        .route("/api/payments/verify", get(verify_payment))
        .route("/api/payments", get(list_payments).post(create_payment))
        .route("/api/payments/:id", get(get_payment))
}
