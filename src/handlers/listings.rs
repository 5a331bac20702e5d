//! Listing handlers

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
use crate::listing::{CreateListingRequest, ListingResponse, UpdateListingRequest};
use crate::models::{ApiResponse, PaginationParams};

/// Create a listing (host role required)
pub async fn create_listing(
    State(app_state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ListingResponse>>), ApiError> {
    request.validate()?;
    let listing = app_state
        .listing_service
        .create_listing(&user, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(listing))))
}

/// Public listing feed
pub async fn list_listings(
    State(app_state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<ListingResponse>>>, ApiError> {
    let listings = app_state.listing_service.list_listings(pagination).await?;
    Ok(Json(ApiResponse::ok(listings)))
}

/// Public single-listing view
pub async fn get_listing(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ListingResponse>>, ApiError> {
    let listing = app_state.listing_service.get_listing(id).await?;
    Ok(Json(ApiResponse::ok(listing)))
}

/// Update a listing (owning host only)
pub async fn update_listing(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<ApiResponse<ListingResponse>>, ApiError> {
    request.validate()?;
    let listing = app_state
        .listing_service
        .update_listing(&user, id, request)
        .await?;
    Ok(Json(ApiResponse::ok(listing)))
}

/// Delete a listing (owning host only)
pub async fn delete_listing(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    app_state.listing_service.delete_listing(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
