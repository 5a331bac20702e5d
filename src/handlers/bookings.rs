//! Booking handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::booking::{
    BookingResponse, CreateBookingRequest, CreateBookingResponse, ListBookingsQuery,
    UpdateBookingRequest,
};
use crate::error::ApiError;
use crate::models::ApiResponse;

/// Create a booking (guest role required). The response carries the new
/// booking plus the gateway checkout URL for its payment.
pub async fn create_booking(
    State(app_state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreateBookingResponse>>), ApiError> {
    let booking = app_state
        .booking_service
        .create_booking(&user, request)
        .await?;

    let payment_url = app_state
        .payment_service
        .initiate_for_booking(&booking, &(&user).into())
        .await?;

    let guest = user.info();

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CreateBookingResponse {
            booking: BookingResponse::from_booking(booking, guest),
            payment_url,
        })),
    ))
}

/// List bookings visible to the caller, optionally filtered by `?listing=`
pub async fn list_bookings(
    State(app_state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ApiResponse<Vec<BookingResponse>>>, ApiError> {
    let bookings = app_state.booking_service.list_bookings(&user, query).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

pub async fn get_booking(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let booking = app_state.booking_service.get_booking(&user, id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// Update a booking under the asymmetric host/guest policy
pub async fn update_booking(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(patch): Json<UpdateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let booking = app_state
        .booking_service
        .update_booking(&user, id, patch)
        .await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// Delete a booking (owning guest only, never a confirmed one)
pub async fn delete_booking(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    app_state.booking_service.delete_booking(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
