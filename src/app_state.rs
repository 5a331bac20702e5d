//! Application state shared across handlers

use std::sync::Arc;

use crate::booking_service::BookingService;
use crate::listing_service::ListingService;
use crate::payment_service::PaymentService;
use crate::review_service::ReviewService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub listing_service: Arc<ListingService>,
    pub booking_service: Arc<BookingService>,
    pub review_service: Arc<ReviewService>,
    pub payment_service: Arc<PaymentService>,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(
        listing_service: Arc<ListingService>,
        booking_service: Arc<BookingService>,
        review_service: Arc<ReviewService>,
        payment_service: Arc<PaymentService>,
        jwt_secret: String,
    ) -> Self {
        Self {
            listing_service,
            booking_service,
            review_service,
            payment_service,
            jwt_secret,
        }
    }
}
