//! Booking service layer - availability, pricing, and lifecycle
//!
//! The overlap check runs inside the same transaction as the write, and
//! the `bookings` table carries a range-exclusion constraint, so two
//! concurrent requests for the same listing and overlapping dates cannot
//! both commit.

use sqlx::types::chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::booking::{
    self, Booking, BookingResponse, BookingStatus, CreateBookingRequest, ListBookingsQuery,
    UpdateBookingRequest,
};
use crate::error::ApiError;
use crate::listing::Listing;
use crate::models::{PaginationParams, UserInfo, UserRole};
use crate::notifier::BookingNotifier;
use crate::user_service;

pub struct BookingService {
    db_pool: PgPool,
    notifier: Arc<BookingNotifier>,
}

impl BookingService {
    pub fn new(db_pool: PgPool, notifier: Arc<BookingNotifier>) -> Self {
        Self { db_pool, notifier }
    }

    /// Create a pending booking for the authenticated guest.
    pub async fn create_booking(
        &self,
        user: &AuthUser,
        request: CreateBookingRequest,
    ) -> Result<Booking, ApiError> {
        booking::validate_creator_role(user.role)?;
        booking::validate_date_order(request.start_date, request.end_date)?;

        let listing =
            sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE listing_id = $1")
                .bind(request.listing)
                .fetch_optional(&self.db_pool)
                .await?
                .ok_or(ApiError::NotFound("Listing"))?;

        user_service::sync_identity(&self.db_pool, user).await?;

        let total_price =
            booking::quote_total(listing.price_per_night, request.start_date, request.end_date);

        let mut tx = self.db_pool.begin().await?;

        Self::check_availability(
            &mut tx,
            listing.listing_id,
            request.start_date,
            request.end_date,
            None,
        )
        .await?;

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                booking_id, listing_id, user_id, start_date, end_date,
                total_price, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing.listing_id)
        .bind(user.id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(total_price)
        .bind(BookingStatus::Pending)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(ApiError::from_booking_insert)?;

        tx.commit().await?;

        tracing::info!(
            booking_id = %booking.booking_id,
            listing_id = %listing.listing_id,
            total = %booking.total_price,
            "booking created"
        );

        Ok(booking)
    }

    /// List bookings visible to the caller: guests see their own, hosts see
    /// bookings on their listings. `?listing=` narrows either view.
    pub async fn list_bookings(
        &self,
        user: &AuthUser,
        query: ListBookingsQuery,
    ) -> Result<Vec<BookingResponse>, ApiError> {
        let (limit, offset) = PaginationParams {
            page: query.page,
            limit: query.limit,
        }
        .limit_offset();

        let mut builder: sqlx::QueryBuilder<Postgres> = sqlx::QueryBuilder::new(
            "SELECT b.* FROM bookings b JOIN listings l ON l.listing_id = b.listing_id WHERE ",
        );
        match user.role {
            UserRole::Host => {
                builder.push("l.host_id = ");
                builder.push_bind(user.id);
            }
            UserRole::Guest => {
                builder.push("b.user_id = ");
                builder.push_bind(user.id);
            }
        }
        if let Some(listing_id) = query.listing {
            builder.push(" AND b.listing_id = ");
            builder.push_bind(listing_id);
        }
        builder.push(" ORDER BY b.created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let bookings = builder
            .build_query_as::<Booking>()
            .fetch_all(&self.db_pool)
            .await?;

        let mut responses = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let guest = self.guest_info(booking.user_id).await?;
            responses.push(BookingResponse::from_booking(booking, guest));
        }
        Ok(responses)
    }

    pub async fn get_booking(
        &self,
        user: &AuthUser,
        id: Uuid,
    ) -> Result<BookingResponse, ApiError> {
        let booking = self.fetch_scoped(user, id).await?;
        let guest = self.guest_info(booking.user_id).await?;
        Ok(BookingResponse::from_booking(booking, guest))
    }

    /// Update a booking under the asymmetric role policy: hosts touch only
    /// `status`, guests touch everything except `status` and any guest edit
    /// drops the booking back to `pending`.
    pub async fn update_booking(
        &self,
        user: &AuthUser,
        id: Uuid,
        patch: UpdateBookingRequest,
    ) -> Result<BookingResponse, ApiError> {
        let current = self.fetch_scoped(user, id).await?;
        let resolved = booking::resolve_update(&current, user.role, &patch);

        let updated = if resolved.reprice {
            booking::validate_date_order(resolved.start_date, resolved.end_date)?;

            let listing =
                sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE listing_id = $1")
                    .bind(resolved.listing_id)
                    .fetch_optional(&self.db_pool)
                    .await?
                    .ok_or(ApiError::NotFound("Listing"))?;

            let total_price = booking::quote_total(
                listing.price_per_night,
                resolved.start_date,
                resolved.end_date,
            );

            let mut tx = self.db_pool.begin().await?;

            Self::check_availability(
                &mut tx,
                resolved.listing_id,
                resolved.start_date,
                resolved.end_date,
                Some(current.booking_id),
            )
            .await?;

            let updated = sqlx::query_as::<_, Booking>(
                r#"
                UPDATE bookings
                SET listing_id = $1, start_date = $2, end_date = $3,
                    total_price = $4, status = $5
                WHERE booking_id = $6
                RETURNING *
                "#,
            )
            .bind(resolved.listing_id)
            .bind(resolved.start_date)
            .bind(resolved.end_date)
            .bind(total_price)
            .bind(resolved.status)
            .bind(current.booking_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(ApiError::from_booking_insert)?;

            tx.commit().await?;
            updated
        } else {
            let mut tx = self.db_pool.begin().await?;

            // Un-canceling puts the row back under the non-overlap
            // constraint, so its dates must be re-checked against bookings
            // made in the meantime.
            if current.status == BookingStatus::Canceled
                && resolved.status != BookingStatus::Canceled
            {
                Self::check_availability(
                    &mut tx,
                    current.listing_id,
                    current.start_date,
                    current.end_date,
                    Some(current.booking_id),
                )
                .await?;
            }

            let updated = sqlx::query_as::<_, Booking>(
                "UPDATE bookings SET status = $1 WHERE booking_id = $2 RETURNING *",
            )
            .bind(resolved.status)
            .bind(current.booking_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(ApiError::from_booking_insert)?;

            tx.commit().await?;
            updated
        };

        let guest = self.guest_info(updated.user_id).await?;

        // Confirmation email goes out once, when the host flips the status.
        if user.role == UserRole::Host
            && updated.status == BookingStatus::Confirmed
            && current.status != BookingStatus::Confirmed
        {
            self.notifier
                .dispatch_confirmation(guest.email.clone(), updated.booking_id);
        }

        tracing::info!(
            booking_id = %updated.booking_id,
            status = ?updated.status,
            "booking updated"
        );

        Ok(BookingResponse::from_booking(updated, guest))
    }

    /// Delete a booking: only the owning guest, and never a confirmed one.
    pub async fn delete_booking(&self, user: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        let booking = self.fetch_scoped(user, id).await?;
        booking::validate_delete(&booking, user.id)?;

        sqlx::query("DELETE FROM bookings WHERE booking_id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        tracing::info!(booking_id = %id, "booking deleted");
        Ok(())
    }

    // ===== Private Helper Methods =====

    /// Reject when any other non-canceled booking on the listing intersects
    /// the closed interval. The exclusion constraint on the table backs this
    /// check against concurrent inserts.
    async fn check_availability(
        tx: &mut Transaction<'_, Postgres>,
        listing_id: Uuid,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<(), ApiError> {
        let (overlapping,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE listing_id = $1
                  AND status <> 'canceled'
                  AND end_date >= $2
                  AND start_date <= $3
                  AND ($4::uuid IS NULL OR booking_id <> $4)
            )
            "#,
        )
        .bind(listing_id)
        .bind(start_date)
        .bind(end_date)
        .bind(exclude)
        .fetch_one(&mut **tx)
        .await?;

        if overlapping {
            return Err(ApiError::validation(
                "start_date",
                "This listing is not available for these dates.",
            ));
        }
        Ok(())
    }

    /// Fetch a booking the caller is allowed to see; anything else is a 404.
    async fn fetch_scoped(&self, user: &AuthUser, id: Uuid) -> Result<Booking, ApiError> {
        let booking = match user.role {
            UserRole::Guest => {
                sqlx::query_as::<_, Booking>(
                    "SELECT * FROM bookings WHERE booking_id = $1 AND user_id = $2",
                )
                .bind(id)
                .bind(user.id)
                .fetch_optional(&self.db_pool)
                .await?
            }
            UserRole::Host => {
                sqlx::query_as::<_, Booking>(
                    r#"
                    SELECT b.* FROM bookings b
                    JOIN listings l ON l.listing_id = b.listing_id
                    WHERE b.booking_id = $1 AND l.host_id = $2
                    "#,
                )
                .bind(id)
                .bind(user.id)
                .fetch_optional(&self.db_pool)
                .await?
            }
        };

        booking.ok_or(ApiError::NotFound("Booking"))
    }

    async fn guest_info(&self, user_id: Uuid) -> Result<UserInfo, ApiError> {
        user_service::get_user_info(&self.db_pool, user_id)
            .await?
            .ok_or(ApiError::NotFound("User"))
    }
}
