//! Error taxonomy for the StayHub API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the API and service layers.
///
/// Each variant maps to a fixed HTTP status so callers can branch on the
/// class of failure rather than on message text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input: date order, overlapping ranges, rating bounds, role
    /// violations on create, malformed fields.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// The caller is authenticated but not allowed to act on this resource.
    #[error("{0}")]
    Permission(String),

    /// The named resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness constraint was hit (duplicate payment reference).
    #[error("{0}")]
    Conflict(String),

    /// The payment gateway answered with a non-success body. The raw
    /// provider payload is passed through to the caller unmodified.
    #[error("payment gateway rejected the transaction")]
    Gateway(serde_json::Value),

    /// Missing or invalid bearer token.
    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Postgres constraint violations raised by booking inserts/updates are
    /// the backstop for the in-transaction overlap check; translate them to
    /// the same validation error the check itself produces.
    pub fn from_booking_insert(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            // 23P01 = exclusion_violation (listing/date-range exclusion)
            if db_err.code().as_deref() == Some("23P01") {
                return Self::validation(
                    "start_date",
                    "This listing is not available for these dates.",
                );
            }
        }
        Self::Database(err)
    }

    /// Unique-violation on `payments.booking_reference` is a distinct
    /// conflict, not a generic validation failure.
    pub fn from_payment_insert(err: sqlx::Error, reference: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            // 23505 = unique_violation
            if db_err.code().as_deref() == Some("23505") {
                return Self::Conflict(format!(
                    "A payment with reference '{}' already exists.",
                    reference
                ));
            }
        }
        Self::Database(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": message, "field": field }),
            ),
            ApiError::Permission(message) => (
                StatusCode::FORBIDDEN,
                json!({ "success": false, "error": message }),
            ),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "error": format!("{} not found", what) }),
            ),
            ApiError::Conflict(message) => (
                StatusCode::CONFLICT,
                json!({ "success": false, "error": message }),
            ),
            // The provider's body goes back verbatim so callers see the
            // gateway's own diagnostics.
            ApiError::Gateway(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "error": message }),
            ),
            ApiError::Database(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Flatten `validator` derive output into the first field error.
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let detail = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value for '{}'", field));
                (field, message)
            });

        match detail {
            Some((field, message)) => Self::Validation { field, message },
            None => Self::validation("body", "validation failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StubDbError {
        code: &'static str,
    }

    impl std::fmt::Display for StubDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "constraint violation ({})", self.code)
        }
    }

    impl std::error::Error for StubDbError {}

    impl sqlx::error::DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "constraint violation"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(self.code.into())
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::Other
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    fn db_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(StubDbError { code }))
    }

    #[test]
    fn exclusion_violation_maps_to_overlap_validation() {
        // every write that can trip the range constraint must surface the
        // same availability error, insert and status-update paths alike
        let err = ApiError::from_booking_insert(db_error("23P01"));
        assert!(matches!(err, ApiError::Validation { field: "start_date", .. }));
    }

    #[test]
    fn other_database_errors_stay_internal() {
        let err = ApiError::from_booking_insert(db_error("23503"));
        assert!(matches!(err, ApiError::Database(_)));
    }

    #[test]
    fn duplicate_payment_reference_maps_to_conflict() {
        let err = ApiError::from_payment_insert(db_error("23505"), "ref-1");
        match err {
            ApiError::Conflict(message) => assert!(message.contains("ref-1")),
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn non_unique_payment_errors_stay_internal() {
        let err = ApiError::from_payment_insert(db_error("23P01"), "ref-1");
        assert!(matches!(err, ApiError::Database(_)));
    }
}
