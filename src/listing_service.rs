//! Listing service layer - CRUD with host ownership rules

use sqlx::types::chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::listing::{CreateListingRequest, Listing, ListingResponse, UpdateListingRequest};
use crate::models::{PaginationParams, UserInfo};
use crate::user_service;

/// Listing row joined with its host's public info.
#[derive(sqlx::FromRow)]
struct ListingHostRow {
    listing_id: Uuid,
    host_id: Uuid,
    name: String,
    description: String,
    country: String,
    city: String,
    address: String,
    price_per_night: rust_decimal::Decimal,
    created_at: sqlx::types::chrono::DateTime<Utc>,
    host_email: String,
    host_first_name: String,
    host_last_name: String,
    updated_at: sqlx::types::chrono::DateTime<Utc>,
}

impl From<ListingHostRow> for ListingResponse {
    fn from(row: ListingHostRow) -> Self {
        ListingResponse {
            listing_id: row.listing_id,
            host: UserInfo {
                id: row.host_id,
                email: row.host_email,
                first_name: row.host_first_name,
                last_name: row.host_last_name,
            },
            name: row.name,
            description: row.description,
            country: row.country,
            city: row.city,
            address: row.address,
            price_per_night: row.price_per_night,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const LISTING_HOST_SELECT: &str = r#"
    SELECT l.listing_id, l.host_id, l.name, l.description, l.country, l.city,
           l.address, l.price_per_night, l.created_at, l.updated_at,
           u.email AS host_email, u.first_name AS host_first_name,
           u.last_name AS host_last_name
    FROM listings l
    JOIN users u ON u.id = l.host_id
"#;

pub struct ListingService {
    db_pool: PgPool,
}

impl ListingService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a listing owned by the authenticated host. The host reference
    /// comes from the token, never the body, and is immutable afterwards.
    pub async fn create_listing(
        &self,
        user: &AuthUser,
        request: CreateListingRequest,
    ) -> Result<ListingResponse, ApiError> {
        if !user.is_host() {
            return Err(ApiError::validation(
                "host",
                "Only hosts can create listings.",
            ));
        }
        if request.price_per_night < rust_decimal::Decimal::ZERO {
            return Err(ApiError::validation(
                "price_per_night",
                "Nightly price must not be negative.",
            ));
        }

        user_service::sync_identity(&self.db_pool, user).await?;

        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (
                listing_id, host_id, name, description, country, city,
                address, price_per_night, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.country)
        .bind(&request.city)
        .bind(&request.address)
        .bind(request.price_per_night)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(listing_id = %listing.listing_id, host_id = %user.id, "listing created");

        Ok(ListingResponse::from_listing(listing, user.info()))
    }

    /// Public listing feed.
    pub async fn list_listings(
        &self,
        pagination: PaginationParams,
    ) -> Result<Vec<ListingResponse>, ApiError> {
        let (limit, offset) = pagination.limit_offset();

        let rows = sqlx::query_as::<_, ListingHostRow>(&format!(
            "{} ORDER BY l.created_at DESC LIMIT $1 OFFSET $2",
            LISTING_HOST_SELECT
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_listing(&self, id: Uuid) -> Result<ListingResponse, ApiError> {
        let row = sqlx::query_as::<_, ListingHostRow>(&format!(
            "{} WHERE l.listing_id = $1",
            LISTING_HOST_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(ApiError::NotFound("Listing"))?;

        Ok(row.into())
    }

    /// Update a listing; only the owning host may.
    pub async fn update_listing(
        &self,
        user: &AuthUser,
        id: Uuid,
        request: UpdateListingRequest,
    ) -> Result<ListingResponse, ApiError> {
        let current = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE listing_id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(ApiError::NotFound("Listing"))?;

        if current.host_id != user.id {
            return Err(ApiError::Permission(
                "You can only update your own listings.".to_string(),
            ));
        }

        let price = request.price_per_night.unwrap_or(current.price_per_night);
        if price < rust_decimal::Decimal::ZERO {
            return Err(ApiError::validation(
                "price_per_night",
                "Nightly price must not be negative.",
            ));
        }

        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET name = $1, description = $2, country = $3, city = $4,
                address = $5, price_per_night = $6, updated_at = $7
            WHERE listing_id = $8
            RETURNING *
            "#,
        )
        .bind(request.name.unwrap_or(current.name))
        .bind(request.description.unwrap_or(current.description))
        .bind(request.country.unwrap_or(current.country))
        .bind(request.city.unwrap_or(current.city))
        .bind(request.address.unwrap_or(current.address))
        .bind(price)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.db_pool)
        .await?;

        let host = user_service::get_user_info(&self.db_pool, listing.host_id)
            .await?
            .unwrap_or_else(|| user.info());

        Ok(ListingResponse::from_listing(listing, host))
    }

    /// Delete a listing; only the owning host may. Bookings and reviews
    /// cascade with it.
    pub async fn delete_listing(&self, user: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        let current = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE listing_id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or(ApiError::NotFound("Listing"))?;

        if current.host_id != user.id {
            return Err(ApiError::Permission(
                "You can only delete your own listings.".to_string(),
            ));
        }

        sqlx::query("DELETE FROM listings WHERE listing_id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        tracing::info!(listing_id = %id, "listing deleted");
        Ok(())
    }
}
