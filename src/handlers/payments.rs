//! Payment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{ApiResponse, PaginationParams};
use crate::payment::{
    CreatePaymentRequest, InitiatePaymentRequest, InitiatePaymentResponse, Payment,
    VerifyPaymentQuery,
};
use crate::payment_service::Payer;

/// Start a checkout for an existing booking reference.
pub async fn initiate_payment(
    State(app_state): State<AppState>,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<Json<InitiatePaymentResponse>, ApiError> {
    request.validate()?;

    let payer = Payer {
        email: request.email.clone(),
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
    };

    let payment_url = app_state
        .payment_service
        .initiate(&request.booking_reference, request.amount, &payer)
        .await?;

    Ok(Json(InitiatePaymentResponse { payment_url }))
}

/// Gateway callback: reconcile the payment behind `tx_ref`.
pub async fn verify_payment(
    State(app_state): State<AppState>,
    Query(query): Query<VerifyPaymentQuery>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let verified = app_state.payment_service.verify(&query.tx_ref).await?;

    if verified {
        Ok((StatusCode::OK, Json(json!({ "detail": "Payment verified" }))))
    } else {
        Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Payment failed" })),
        ))
    }
}

// ===== Administrative CRUD =====

pub async fn create_payment(
    State(app_state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Payment>>), ApiError> {
    request.validate()?;
    let payment = app_state
        .payment_service
        .create_payment(&request.booking_reference, request.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(payment))))
}

pub async fn list_payments(
    State(app_state): State<AppState>,
    _user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<Payment>>>, ApiError> {
    let payments = app_state.payment_service.list_payments(pagination).await?;
    Ok(Json(ApiResponse::ok(payments)))
}

pub async fn get_payment(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    _user: AuthUser,
) -> Result<Json<ApiResponse<Payment>>, ApiError> {
    let payment = app_state.payment_service.get_payment(id).await?;
    Ok(Json(ApiResponse::ok(payment)))
}
