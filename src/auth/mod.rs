pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{PublicUser, UserProfile};

// Re-export necessary items
pub use extractors::CallerId;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenIssuer};

/// Name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "accessTokenUser";

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Password length in UTF-16 code units, which is how browser clients count it.
/// A character outside the Basic Multilingual Plane counts as two.
fn password_len(password: &str) -> usize {
    password.encode_utf16().count()
}

fn check_password(password: &str, message: &'static str) -> Result<(), ValidationError> {
    if password_len(password) >= MIN_PASSWORD_LEN {
        return Ok(());
    }
    let mut error = ValidationError::new("length");
    error.message = Some(Cow::Borrowed(message));
    Err(error)
}

fn register_password(password: &str) -> Result<(), ValidationError> {
    check_password(
        password,
        "Password is required and must be 6 characters minimum",
    )
}

fn login_password(password: &str) -> Result<(), ValidationError> {
    check_password(
        password,
        "Password is required and must be at least 6 characters long",
    )
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Optional display name.
    pub name: Option<String>,
    /// Email address for the new account. Must be present and non-empty.
    #[validate(
        required(message = "Email is required"),
        length(min = 1, message = "Email is required")
    )]
    pub email: Option<String>,
    /// Password for the new account. Must be at least 6 UTF-16 code units long.
    #[validate(
        required(message = "Password is required and must be 6 characters minimum"),
        custom = "register_password"
    )]
    pub password: Option<String>,
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        required(message = "Email is required"),
        length(min = 1, message = "Email is required")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Password is required and must be at least 6 characters long"),
        custom = "login_password"
    )]
    pub password: Option<String>,
}

/// Plain `{"message": ...}` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response after a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Response after a successful login.
///
/// The access token is also set as the `accessTokenUser` cookie and echoed in the
/// `Authorization` header; the cookie is the primary channel.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub access_token_user: String,
    pub refresh_token_user: String,
}

/// Response of the profile endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_profile: UserProfile,
}
