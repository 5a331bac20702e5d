//! Review model and the review gate rules

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::{UserInfo, UserRole};

/// Guest feedback on a listing. `user_id` is nullable so reviews survive
/// account deletion.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Review {
    pub review_id: Uuid,
    pub listing_id: Uuid,
    pub user_id: Option<Uuid>,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for creating a review. The listing association comes from
/// the enclosing route, never from the body.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i32,
    pub comment: String,
}

/// Review payload with the author's public info embedded.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub review_id: Uuid,
    pub listing: Uuid,
    pub user: Option<UserInfo>,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl ReviewResponse {
    pub fn from_review(review: Review, user: Option<UserInfo>) -> Self {
        Self {
            review_id: review.review_id,
            listing: review.listing_id,
            user,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

/// Only guests leave reviews.
pub fn validate_reviewer_role(role: UserRole) -> Result<(), ApiError> {
    if role == UserRole::Host {
        return Err(ApiError::validation(
            "user",
            "Only guests can create reviews.",
        ));
    }
    Ok(())
}

/// Only the author may delete their review.
pub fn validate_review_delete(review: &Review, requester: Uuid) -> Result<(), ApiError> {
    if review.user_id != Some(requester) {
        return Err(ApiError::Permission(
            "You can only delete your own review.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_with_author(author: Option<Uuid>) -> Review {
        Review {
            review_id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            user_id: author,
            rating: 4,
            comment: "Great stay".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        for (rating, ok) in [(0, false), (1, true), (3, true), (5, true), (6, false)] {
            let req = CreateReviewRequest {
                rating,
                comment: String::new(),
            };
            assert_eq!(req.validate().is_ok(), ok, "rating {}", rating);
        }
    }

    #[test]
    fn hosts_cannot_review() {
        assert!(validate_reviewer_role(UserRole::Host).is_err());
        assert!(validate_reviewer_role(UserRole::Guest).is_ok());
    }

    #[test]
    fn only_author_deletes() {
        let author = Uuid::new_v4();
        let review = review_with_author(Some(author));
        assert!(validate_review_delete(&review, author).is_ok());
        assert!(validate_review_delete(&review, Uuid::new_v4()).is_err());
    }

    #[test]
    fn orphaned_review_cannot_be_deleted_by_anyone() {
        let review = review_with_author(None);
        assert!(validate_review_delete(&review, Uuid::new_v4()).is_err());
    }
}
