//! Local mirror of externally-managed identities
//!
//! The auth service owns accounts; we keep the public slice of each
//! identity in a `users` table so listings, bookings, and reviews can
//! embed author info and carry foreign keys. Rows are refreshed from token
//! claims whenever an authenticated user writes.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::UserInfo;

/// Insert or refresh the caller's mirrored identity.
pub async fn sync_identity(pool: &PgPool, user: &AuthUser) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, first_name, last_name)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO UPDATE
        SET email = EXCLUDED.email,
            first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch the public info for a mirrored identity, if it exists.
pub async fn get_user_info(pool: &PgPool, id: Uuid) -> Result<Option<UserInfo>, ApiError> {
    let row = sqlx::query_as::<_, (Uuid, String, String, String)>(
        "SELECT id, email, first_name, last_name FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(id, email, first_name, last_name)| UserInfo {
        id,
        email,
        first_name,
        last_name,
    }))
}
