use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::auth_model::{LoginCode, LoginCodeIssued, NewLoginCode};
use crate::errors::Result;
use crate::users::User;

/// Trait for login code persistence
#[async_trait]
pub trait LoginCodeRepositoryTrait: Send + Sync {
    /// Stores a new code and drops every earlier code for the same email.
    async fn replace_login_code(&self, new_code: NewLoginCode) -> Result<LoginCode>;
    /// Latest unconsumed, unexpired code for `email`.
    fn find_active_code(&self, email: &str, now: NaiveDateTime) -> Result<Option<LoginCode>>;
    async fn record_failed_attempt(&self, code_id: String) -> Result<LoginCode>;
    async fn consume_code(&self, code_id: String) -> Result<()>;
    /// Deletes codes that expired or were consumed before `now`.
    async fn delete_expired_codes(&self, now: NaiveDateTime) -> Result<usize>;
}

/// Delivers a plain login code to its recipient.
#[async_trait]
pub trait LoginCodeSenderTrait: Send + Sync {
    async fn send_code(&self, email: &str, code: &str) -> Result<()>;
}

/// Trait for sign-in operations
#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn request_code(&self, email: &str) -> Result<LoginCodeIssued>;
    async fn verify_code(&self, email: &str, code: &str) -> Result<User>;
    async fn purge_expired_codes(&self, now: NaiveDateTime) -> Result<usize>;
}
