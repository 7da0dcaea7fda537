//! Sign-in error types.

use thiserror::Error;

/// Errors raised while issuing or verifying login codes.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// The code is wrong, expired or was already used.
    #[error("Invalid or expired login code")]
    InvalidCode,

    #[error("Too many failed attempts; request a new code")]
    TooManyAttempts,

    #[error("Failed to deliver login code: {0}")]
    DeliveryFailed(String),
}
