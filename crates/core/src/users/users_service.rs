use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::users_model::{normalize_email, NewUser, User};
use super::users_traits::{UserRepositoryTrait, UserServiceTrait};
use crate::errors::{DatabaseError, Error, Result, ValidationError};

const MAX_NAME_LEN: usize = 80;

pub struct UserService {
    user_repository: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(user_repository: Arc<dyn UserRepositoryTrait>) -> Self {
        UserService { user_repository }
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    fn get_user(&self, user_id: &str) -> Result<User> {
        self.user_repository.get_by_id(user_id)
    }

    async fn find_or_create_by_email(&self, email: &str) -> Result<User> {
        let email = normalize_email(email)?;
        if let Some(user) = self.user_repository.find_by_email(&email)? {
            return Ok(user);
        }

        debug!("Creating user record for {}", email);
        match self
            .user_repository
            .create(NewUser {
                email: email.clone(),
                name: None,
            })
            .await
        {
            Ok(user) => Ok(user),
            // Lost a race with a concurrent insert for the same address
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => self
                .user_repository
                .find_by_email(&email)?
                .ok_or_else(|| Error::not_found(format!("User {}", email))),
            Err(e) => Err(e),
        }
    }

    async fn update_name(&self, user_id: &str, name: Option<String>) -> Result<User> {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if let Some(n) = &name {
            if n.chars().count() > MAX_NAME_LEN {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Name must be at most {} characters",
                    MAX_NAME_LEN
                ))));
            }
        }
        self.user_repository
            .update_name(user_id.to_string(), name)
            .await
    }

    async fn touch_last_login(&self, user_id: &str) -> Result<User> {
        self.user_repository
            .touch_last_login(user_id.to_string())
            .await
    }
}
