//! Listing model and request/response types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::models::UserInfo;

/// A rentable unit owned by one host. The host reference is set from the
/// authenticated identity at creation and never changes afterwards.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Listing {
    pub listing_id: Uuid,
    pub host_id: Uuid,
    pub name: String,
    pub description: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub price_per_night: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing payload with the host's public info embedded.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub listing_id: Uuid,
    pub host: UserInfo,
    pub name: String,
    pub description: String,
    pub country: String,
    pub city: String,
    pub address: String,
    pub price_per_night: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingResponse {
    pub fn from_listing(listing: Listing, host: UserInfo) -> Self {
        Self {
            listing_id: listing.listing_id,
            host,
            name: listing.name,
            description: listing.description,
            country: listing.country,
            city: listing.city,
            address: listing.address,
            price_per_night: listing.price_per_night,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

/// Request DTO for creating a listing
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters."))]
    pub name: String,
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    /// Checked non-negative in the service layer; `validator` has no range
    /// support for decimals.
    pub price_per_night: Decimal,
}

/// Request DTO for updating a listing; absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListingRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address: Option<String>,
    pub price_per_night: Option<Decimal>,
}
