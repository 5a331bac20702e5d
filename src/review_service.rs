//! Review service layer - the review gate over listing feedback

use sqlx::types::chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::PaginationParams;
use crate::review::{self, CreateReviewRequest, Review, ReviewResponse};
use crate::user_service;

pub struct ReviewService {
    db_pool: PgPool,
}

impl ReviewService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a review on a listing. The listing comes from the enclosing
    /// route, the author from the token; neither is client-supplied.
    pub async fn create_review(
        &self,
        user: &AuthUser,
        listing_id: Uuid,
        request: CreateReviewRequest,
    ) -> Result<ReviewResponse, ApiError> {
        review::validate_reviewer_role(user.role)?;

        let listing_exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM listings WHERE listing_id = $1)")
                .bind(listing_id)
                .fetch_one(&self.db_pool)
                .await?;
        if !listing_exists.0 {
            return Err(ApiError::NotFound("Listing"));
        }

        user_service::sync_identity(&self.db_pool, user).await?;

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (review_id, listing_id, user_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(user.id)
        .bind(request.rating)
        .bind(&request.comment)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(review_id = %review.review_id, listing_id = %listing_id, "review created");

        Ok(ReviewResponse::from_review(review, Some(user.info())))
    }

    /// Public reviews for one listing.
    pub async fn list_reviews(
        &self,
        listing_id: Uuid,
        pagination: PaginationParams,
    ) -> Result<Vec<ReviewResponse>, ApiError> {
        let (limit, offset) = pagination.limit_offset();

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE listing_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(listing_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db_pool)
        .await?;

        let mut responses = Vec::with_capacity(reviews.len());
        for review in reviews {
            let author = match review.user_id {
                Some(id) => user_service::get_user_info(&self.db_pool, id).await?,
                None => None,
            };
            responses.push(ReviewResponse::from_review(review, author));
        }
        Ok(responses)
    }

    pub async fn get_review(
        &self,
        listing_id: Uuid,
        review_id: Uuid,
    ) -> Result<ReviewResponse, ApiError> {
        let review = self.fetch_review(listing_id, review_id).await?;
        let author = match review.user_id {
            Some(id) => user_service::get_user_info(&self.db_pool, id).await?,
            None => None,
        };
        Ok(ReviewResponse::from_review(review, author))
    }

    /// Delete a review; only its author may.
    pub async fn delete_review(
        &self,
        user: &AuthUser,
        listing_id: Uuid,
        review_id: Uuid,
    ) -> Result<(), ApiError> {
        let review = self.fetch_review(listing_id, review_id).await?;
        review::validate_review_delete(&review, user.id)?;

        sqlx::query("DELETE FROM reviews WHERE review_id = $1")
            .bind(review_id)
            .execute(&self.db_pool)
            .await?;

        tracing::info!(review_id = %review_id, "review deleted");
        Ok(())
    }

    /// Reviews are nested under their listing; a review id reached through
    /// the wrong listing is a 404.
    async fn fetch_review(&self, listing_id: Uuid, review_id: Uuid) -> Result<Review, ApiError> {
        sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE review_id = $1 AND listing_id = $2",
        )
        .bind(review_id)
        .bind(listing_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(ApiError::NotFound("Review"))
    }
}
