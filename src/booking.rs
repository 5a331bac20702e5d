//! Booking model, validation rules, and pricing
//!
//! The rules here are pure so they can be exercised without a database:
//! closed-interval overlap, date ordering, the inclusive-night price, and
//! the asymmetric host/guest update policy.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{UserInfo, UserRole};

/// Booking lifecycle. Created `pending` by the guest; only the listing's
/// host moves it to `confirmed` or `canceled`.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Canceled,
}

/// A reservation of a listing for an inclusive date range.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Booking {
    pub booking_id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for creating a booking
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub listing: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Request DTO for updating a booking; absent fields are left untouched.
/// Which fields actually apply depends on the caller's role, see
/// [`resolve_update`].
#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub listing: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
}

/// Booking payload with the guest's public info embedded.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub listing: Uuid,
    pub user: UserInfo,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl BookingResponse {
    pub fn from_booking(booking: Booking, user: UserInfo) -> Self {
        Self {
            booking_id: booking.booking_id,
            listing: booking.listing_id,
            user,
            start_date: booking.start_date,
            end_date: booking.end_date,
            total_price: booking.total_price,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

/// Create response: the booking plus the gateway checkout URL (absent when
/// payment initiation failed; the payment record is then already `Failed`).
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub payment_url: Option<String>,
}

/// Query parameters for listing bookings
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    /// Narrow to one listing: `GET /api/bookings?listing=<listing_id>`
    pub listing: Option<Uuid>,
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

// ===== Validation & Pricing Rules =====

/// Closed-interval intersection. Both bounds are inclusive, so a booking
/// ending the day another starts counts as overlapping.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_end >= b_start && a_start <= b_end
}

/// Reject inverted ranges. A single-day stay (start == end) is valid.
pub fn validate_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
    if start > end {
        return Err(ApiError::validation(
            "end_date",
            "End date must be after start date.",
        ));
    }
    Ok(())
}

/// Only guests create bookings; hosts act on existing ones.
pub fn validate_creator_role(role: UserRole) -> Result<(), ApiError> {
    if role == UserRole::Host {
        return Err(ApiError::validation(
            "user",
            "Hosts cannot create bookings.",
        ));
    }
    Ok(())
}

/// Total price for an inclusive date range: both the start and end night
/// are billable, so a one-day stay costs one night.
pub fn quote_total(price_per_night: Decimal, start: NaiveDate, end: NaiveDate) -> Decimal {
    let nights = (end - start).num_days() + 1;
    price_per_night * Decimal::from(nights)
}

/// Field values a booking update resolves to after the role policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUpdate {
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    /// True when dates or listing moved, so the total must be re-quoted and
    /// the overlap check re-run.
    pub reprice: bool,
}

/// Apply the asymmetric update policy.
///
/// Hosts may change only `status`; every other field is ignored. Guests may
/// change anything except `status`, and any guest edit resets the booking
/// to `pending` so the host has to re-confirm.
pub fn resolve_update(
    current: &Booking,
    role: UserRole,
    patch: &UpdateBookingRequest,
) -> ResolvedUpdate {
    match role {
        UserRole::Host => ResolvedUpdate {
            listing_id: current.listing_id,
            start_date: current.start_date,
            end_date: current.end_date,
            status: patch.status.unwrap_or(current.status),
            reprice: false,
        },
        UserRole::Guest => {
            let listing_id = patch.listing.unwrap_or(current.listing_id);
            let start_date = patch.start_date.unwrap_or(current.start_date);
            let end_date = patch.end_date.unwrap_or(current.end_date);
            let reprice = listing_id != current.listing_id
                || start_date != current.start_date
                || end_date != current.end_date;
            ResolvedUpdate {
                listing_id,
                start_date,
                end_date,
                status: BookingStatus::Pending,
                reprice,
            }
        }
    }
}

/// Deletion policy: only the owning guest deletes, and never a confirmed
/// booking (those must be canceled through the status transition).
pub fn validate_delete(booking: &Booking, requester: Uuid) -> Result<(), ApiError> {
    if booking.user_id != requester {
        return Err(ApiError::Permission(
            "You can only delete your own booking.".to_string(),
        ));
    }
    if booking.status == BookingStatus::Confirmed {
        return Err(ApiError::Permission(
            "Cannot delete a confirmed booking. Set status to canceled instead.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn booking(start: &str, end: &str, status: BookingStatus) -> Booking {
        Booking {
            booking_id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_date: d(start),
            end_date: d(end),
            total_price: dec!(100),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn touching_endpoints_overlap() {
        // one booking ends the day the other starts: inclusive bounds collide
        assert!(ranges_overlap(
            d("2024-01-01"),
            d("2024-01-03"),
            d("2024-01-03"),
            d("2024-01-05"),
        ));
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        assert!(!ranges_overlap(
            d("2024-01-01"),
            d("2024-01-02"),
            d("2024-01-03"),
            d("2024-01-05"),
        ));
    }

    #[test]
    fn containment_overlaps() {
        assert!(ranges_overlap(
            d("2024-01-01"),
            d("2024-01-10"),
            d("2024-01-04"),
            d("2024-01-05"),
        ));
    }

    #[test]
    fn inverted_range_rejected() {
        let err = validate_date_order(d("2024-02-02"), d("2024-02-01")).unwrap_err();
        assert!(matches!(err, ApiError::Validation { field: "end_date", .. }));
    }

    #[test]
    fn single_day_range_accepted() {
        assert!(validate_date_order(d("2024-02-01"), d("2024-02-01")).is_ok());
    }

    #[test]
    fn host_cannot_create() {
        assert!(validate_creator_role(UserRole::Host).is_err());
        assert!(validate_creator_role(UserRole::Guest).is_ok());
    }

    #[test]
    fn one_night_stay_costs_one_night() {
        let total = quote_total(dec!(100), d("2024-01-01"), d("2024-01-01"));
        assert_eq!(total, dec!(100));
    }

    #[test]
    fn three_inclusive_nights() {
        // Jan 1 .. Jan 3 at 100/night = 300, both endpoints billable
        let total = quote_total(dec!(100), d("2024-01-01"), d("2024-01-03"));
        assert_eq!(total, dec!(300));
    }

    #[test]
    fn host_update_touches_only_status() {
        let current = booking("2024-03-01", "2024-03-04", BookingStatus::Pending);
        let patch = UpdateBookingRequest {
            listing: Some(Uuid::new_v4()),
            start_date: Some(d("2024-04-01")),
            end_date: Some(d("2024-04-02")),
            status: Some(BookingStatus::Confirmed),
        };

        let resolved = resolve_update(&current, UserRole::Host, &patch);
        assert_eq!(resolved.status, BookingStatus::Confirmed);
        assert_eq!(resolved.start_date, current.start_date);
        assert_eq!(resolved.end_date, current.end_date);
        assert_eq!(resolved.listing_id, current.listing_id);
        assert!(!resolved.reprice);
    }

    #[test]
    fn guest_update_resets_status_to_pending() {
        let current = booking("2024-03-01", "2024-03-04", BookingStatus::Confirmed);
        let patch = UpdateBookingRequest {
            listing: None,
            start_date: Some(d("2024-03-02")),
            end_date: None,
            status: Some(BookingStatus::Confirmed), // ignored for guests
        };

        let resolved = resolve_update(&current, UserRole::Guest, &patch);
        assert_eq!(resolved.status, BookingStatus::Pending);
        assert_eq!(resolved.start_date, d("2024-03-02"));
        assert!(resolved.reprice);
    }

    #[test]
    fn guest_noop_update_still_resets_status() {
        let current = booking("2024-03-01", "2024-03-04", BookingStatus::Confirmed);
        let patch = UpdateBookingRequest {
            listing: None,
            start_date: None,
            end_date: None,
            status: None,
        };

        let resolved = resolve_update(&current, UserRole::Guest, &patch);
        assert_eq!(resolved.status, BookingStatus::Pending);
        assert!(!resolved.reprice);
    }

    #[test]
    fn confirmed_booking_cannot_be_deleted_even_by_owner() {
        let b = booking("2024-03-01", "2024-03-04", BookingStatus::Confirmed);
        assert!(validate_delete(&b, b.user_id).is_err());
    }

    #[test]
    fn only_owner_deletes_pending_booking() {
        let b = booking("2024-03-01", "2024-03-04", BookingStatus::Pending);
        assert!(validate_delete(&b, Uuid::new_v4()).is_err());
        assert!(validate_delete(&b, b.user_id).is_ok());
    }

    #[test]
    fn overlap_predicate_is_symmetric_and_matches_intersection() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        let base = d("2024-01-01");

        for _ in 0..2000 {
            let a0 = rng.gen_range(0..120i64);
            let a1 = a0 + rng.gen_range(0..30i64);
            let b0 = rng.gen_range(0..120i64);
            let b1 = b0 + rng.gen_range(0..30i64);

            let (a_start, a_end) = (base + chrono::Days::new(a0 as u64), base + chrono::Days::new(a1 as u64));
            let (b_start, b_end) = (base + chrono::Days::new(b0 as u64), base + chrono::Days::new(b1 as u64));

            // brute-force day-set intersection as the oracle
            let intersects = a0.max(b0) <= a1.min(b1);

            assert_eq!(ranges_overlap(a_start, a_end, b_start, b_end), intersects);
            assert_eq!(
                ranges_overlap(a_start, a_end, b_start, b_end),
                ranges_overlap(b_start, b_end, a_start, a_end),
            );
        }
    }
}
