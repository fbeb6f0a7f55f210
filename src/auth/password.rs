use crate::error::AppError;
use actix_web::web;

/// bcrypt-based credential hasher.
///
/// The salt is generated per hash and stored inside the hash string, so `verify`
/// needs nothing besides the stored value.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    /// Returns `Ok(false)` on mismatch; errors only when `hashed_password` is not a
    /// bcrypt hash.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        bcrypt::verify(password, hashed_password)
            .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
    }

    /// `hash` on the blocking thread pool, keeping bcrypt off the async workers.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = *self;
        web::block(move || hasher.hash(&password)).await?
    }

    /// `verify` on the blocking thread pool.
    pub async fn verify_blocking(
        &self,
        password: String,
        hashed_password: String,
    ) -> Result<bool, AppError> {
        let hasher = *self;
        web::block(move || hasher.verify(&password, &hashed_password)).await?
    }
}
