pub mod ownership;
pub mod password;
pub mod reset;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub use ownership::{ensure_owner, Principal};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token subject no longer exists")]
    UnknownUser,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Session token claims: the user id plus issue and expiry times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: Uuid, expiry_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            iat: now.timestamp(),
            exp: (now + Duration::days(expiry_days)).timestamp(),
        }
    }
}

pub fn generate_jwt(security: &SecurityConfig, user_id: Uuid) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::Signing("JWT secret not configured".to_string()));
    }
    let claims = Claims::new(user_id, security.jwt_expiry_days);
    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &encoding_key).map_err(|e| AuthError::Signing(e.to_string()))
}

/// HS256 signature and expiry check
pub fn validate_jwt(security: &SecurityConfig, token: &str) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::InvalidToken("JWT secret not configured".to_string()));
    }
    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security() -> SecurityConfig {
        let mut security = AppConfig::development().security;
        security.jwt_secret = "test-secret".to_string();
        security
    }

    #[test]
    fn issued_tokens_verify() {
        let id = Uuid::new_v4();
        let token = generate_jwt(&security(), id).unwrap();
        let claims = validate_jwt(&security(), &token).unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt(&security(), Uuid::new_v4()).unwrap();
        let mut other = security();
        other.jwt_secret = "other".to_string();
        assert!(matches!(validate_jwt(&other, &token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let claims = Claims {
            id: Uuid::new_v4(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(validate_jwt(&security(), &token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(validate_jwt(&security(), "not.a.token").is_err());
    }
}
