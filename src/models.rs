//! Shared data models for the StayHub backend

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marketplace roles. The auth provider assigns exactly one per identity;
/// hosts own listings and confirm bookings, guests book and review.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Host,
    Guest,
}

/// Public slice of an identity, embedded in listing/booking/review payloads.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Pagination parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

impl PaginationParams {
    /// Clamped (limit, offset) pair; page is 1-based. The offset is
    /// computed in i64 so client-supplied page numbers near i32::MAX
    /// cannot overflow.
    pub fn limit_offset(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1) as i64;
        let limit = self.limit.unwrap_or(20).clamp(1, 100) as i64;
        (limit, (page - 1) * limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let params = PaginationParams {
            page: None,
            limit: None,
        };
        assert_eq!(params.limit_offset(), (20, 0));

        let params = PaginationParams {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(params.limit_offset(), (100, 0));
    }

    #[test]
    fn extreme_page_numbers_do_not_overflow() {
        let params = PaginationParams {
            page: Some(i32::MAX),
            limit: Some(100),
        };
        let (limit, offset) = params.limit_offset();
        assert_eq!(limit, 100);
        assert_eq!(offset, (i32::MAX as i64 - 1) * 100);
        assert!(offset > 0);
    }
}
