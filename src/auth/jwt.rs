//! JWT encoding/decoding for tokens minted by the auth provider

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::UserRole;

/// Claims carried by an access token. The auth service signs these with the
/// shared HS256 secret; we only verify and read them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub exp: i64,
}

/// Mint a token. Used by tests and local tooling; production tokens come
/// from the auth service.
pub fn generate_token(
    user_id: Uuid,
    email: &str,
    first_name: &str,
    last_name: &str,
    role: UserRole,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        role,
        exp: (Utc::now() + Duration::hours(24)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_claims() {
        let id = Uuid::new_v4();
        let token =
            generate_token(id, "g@example.com", "Gia", "Guest", UserRole::Guest, "s3cret").unwrap();
        let claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, UserRole::Guest);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = generate_token(
            Uuid::new_v4(),
            "h@example.com",
            "Hank",
            "Host",
            UserRole::Host,
            "right",
        )
        .unwrap();
        assert!(verify_token(&token, "wrong").is_err());
    }
}
