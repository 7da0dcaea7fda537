use crate::errors::Result;
use crate::users::users_model::{NewUser, User};
use async_trait::async_trait;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    fn get_by_id(&self, user_id: &str) -> Result<User>;
    /// Looks up a user by an already normalized email.
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn create(&self, new_user: NewUser) -> Result<User>;
    async fn update_name(&self, user_id: String, name: Option<String>) -> Result<User>;
    async fn touch_last_login(&self, user_id: String) -> Result<User>;
}

/// Trait for user service operations
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    fn get_user(&self, user_id: &str) -> Result<User>;
    async fn find_or_create_by_email(&self, email: &str) -> Result<User>;
    async fn update_name(&self, user_id: &str, name: Option<String>) -> Result<User>;
    async fn touch_last_login(&self, user_id: &str) -> Result<User>;
}
