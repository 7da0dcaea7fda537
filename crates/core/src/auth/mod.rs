//! Passwordless email sign-in.
//!
//! A user asks for a one-time code, receives it through a
//! [`LoginCodeSenderTrait`] implementation and trades it back for their user
//! record. Only a hash of each code is stored.

mod auth_errors;
mod auth_model;
mod auth_service;
mod auth_traits;


pub use auth_errors::AuthError;
pub use auth_model::{hash_login_code, LoginCode, LoginCodeIssued, NewLoginCode};
pub use auth_service::AuthService;
pub use auth_traits::{AuthServiceTrait, LoginCodeRepositoryTrait, LoginCodeSenderTrait};
