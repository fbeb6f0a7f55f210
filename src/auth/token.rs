use crate::{config::Config, error::AppError, models::User};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The user's unique identifier.
    pub id: Uuid,
    pub email: String,
    pub role: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Mints signed JWTs for authenticated users.
///
/// Access and refresh tokens are signed with different secrets, so one class can
/// never be accepted in place of the other. Built once from `Config` at startup.
#[derive(Clone)]
pub struct TokenIssuer {
    access_key: EncodingKey,
    access_verify_key: DecodingKey,
    refresh_key: EncodingKey,
}

impl TokenIssuer {
    /// Lifetime of an access token.
    pub fn access_ttl() -> Duration {
        Duration::days(1)
    }

    /// Lifetime of a refresh token.
    pub fn refresh_ttl() -> Duration {
        Duration::days(30)
    }

    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access_key: EncodingKey::from_secret(access_secret.as_bytes()),
            access_verify_key: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.access_token_secret, &config.refresh_token_secret)
    }

    /// Generates an access token for `user`, valid for one day.
    pub fn issue_access(&self, user: &User) -> Result<String, AppError> {
        sign(&self.access_key, user, Self::access_ttl())
    }

    /// Generates a refresh token for `user`, valid for thirty days.
    pub fn issue_refresh(&self, user: &User) -> Result<String, AppError> {
        sign(&self.refresh_key, user, Self::refresh_ttl())
    }

    /// Verifies an access token's signature and expiry and decodes its claims.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, signed with another
    /// secret, or expired.
    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.access_verify_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

fn sign(key: &EncodingKey, user: &User, ttl: Duration) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        id: user.id,
        email: user.email.clone(),
        role: user.role.clone(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(&Header::default(), &claims, key)
        .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}
