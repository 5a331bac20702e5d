//! Review handlers (nested under listings)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{ApiResponse, PaginationParams};
use crate::review::{CreateReviewRequest, ReviewResponse};

/// Create a review on a listing (guest role required). The listing comes
/// from the route, never the body.
pub async fn create_review(
    State(app_state): State<AppState>,
    Path(listing_id): Path<Uuid>,
    user: AuthUser,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewResponse>>), ApiError> {
    request.validate()?;
    let review = app_state
        .review_service
        .create_review(&user, listing_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}

/// Public reviews for one listing
pub async fn list_reviews(
    State(app_state): State<AppState>,
    Path(listing_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<ReviewResponse>>>, ApiError> {
    let reviews = app_state
        .review_service
        .list_reviews(listing_id, pagination)
        .await?;
    Ok(Json(ApiResponse::ok(reviews)))
}

pub async fn get_review(
    State(app_state): State<AppState>,
    Path((listing_id, review_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<ReviewResponse>>, ApiError> {
    let review = app_state
        .review_service
        .get_review(listing_id, review_id)
        .await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// Delete a review (author only)
pub async fn delete_review(
    State(app_state): State<AppState>,
    Path((listing_id, review_id)): Path<(Uuid, Uuid)>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    app_state
        .review_service
        .delete_review(&user, listing_id, review_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
