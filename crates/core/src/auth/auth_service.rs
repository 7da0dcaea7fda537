use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use log::{debug, info, warn};
use rand::rngs::OsRng;
use rand::Rng;

use super::auth_errors::AuthError;
use super::auth_model::{hash_login_code, LoginCodeIssued, NewLoginCode};
use super::auth_traits::{AuthServiceTrait, LoginCodeRepositoryTrait, LoginCodeSenderTrait};
use crate::constants::{LOGIN_CODE_DIGITS, LOGIN_CODE_MAX_ATTEMPTS, LOGIN_CODE_TTL_MINUTES};
use crate::errors::Result;
use crate::users::{normalize_email, User, UserServiceTrait};

pub struct AuthService {
    code_repository: Arc<dyn LoginCodeRepositoryTrait>,
    code_sender: Arc<dyn LoginCodeSenderTrait>,
    user_service: Arc<dyn UserServiceTrait>,
}

impl AuthService {
    pub fn new(
        code_repository: Arc<dyn LoginCodeRepositoryTrait>,
        code_sender: Arc<dyn LoginCodeSenderTrait>,
        user_service: Arc<dyn UserServiceTrait>,
    ) -> Self {
        AuthService {
            code_repository,
            code_sender,
            user_service,
        }
    }
}

fn generate_code() -> String {
    let upper = 10u32.pow(LOGIN_CODE_DIGITS);
    let value = OsRng.gen_range(0..upper);
    format!("{:0width$}", value, width = LOGIN_CODE_DIGITS as usize)
}

fn is_well_formed(code: &str) -> bool {
    code.len() == LOGIN_CODE_DIGITS as usize && code.chars().all(|c| c.is_ascii_digit())
}

fn normalize_sign_in_email(email: &str) -> Result<String> {
    normalize_email(email).map_err(|_| AuthError::InvalidEmail(email.trim().to_string()).into())
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn request_code(&self, email: &str) -> Result<LoginCodeIssued> {
        let email = normalize_sign_in_email(email)?;
        let code = generate_code();
        let expires_at = Utc::now() + Duration::minutes(LOGIN_CODE_TTL_MINUTES);

        self.code_repository
            .replace_login_code(NewLoginCode {
                email: email.clone(),
                code_hash: hash_login_code(&email, &code),
                expires_at: expires_at.naive_utc(),
            })
            .await?;

        if let Err(e) = self.code_sender.send_code(&email, &code).await {
            warn!("Failed to deliver login code to {}: {}", email, e);
            return Err(AuthError::DeliveryFailed(e.to_string()).into());
        }

        debug!("Login code issued for {}", email);
        Ok(LoginCodeIssued { email, expires_at })
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<User> {
        let email = normalize_sign_in_email(email)?;
        let code = code.trim();
        if !is_well_formed(code) {
            return Err(AuthError::InvalidCode.into());
        }

        let now = Utc::now().naive_utc();
        let stored = self
            .code_repository
            .find_active_code(&email, now)?
            .ok_or(AuthError::InvalidCode)?;
        if stored.attempts >= LOGIN_CODE_MAX_ATTEMPTS {
            return Err(AuthError::TooManyAttempts.into());
        }

        if stored.code_hash != hash_login_code(&email, code) {
            let updated = self
                .code_repository
                .record_failed_attempt(stored.id)
                .await?;
            debug!(
                "Wrong login code for {} (attempt {}/{})",
                email, updated.attempts, LOGIN_CODE_MAX_ATTEMPTS
            );
            if updated.attempts >= LOGIN_CODE_MAX_ATTEMPTS {
                return Err(AuthError::TooManyAttempts.into());
            }
            return Err(AuthError::InvalidCode.into());
        }

        self.code_repository.consume_code(stored.id).await?;
        let user = self.user_service.find_or_create_by_email(&email).await?;
        let user = self.user_service.touch_last_login(&user.id).await?;
        info!("User {} signed in", user.id);
        Ok(user)
    }

    async fn purge_expired_codes(&self, now: NaiveDateTime) -> Result<usize> {
        let deleted = self.code_repository.delete_expired_codes(now).await?;
        if deleted > 0 {
            debug!("Purged {} expired login codes", deleted);
        }
        Ok(deleted)
    }
}
