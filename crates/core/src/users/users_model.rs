//! Users domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_EMAIL_LEN;
use crate::errors::{Error, Result, ValidationError};

/// Domain model representing a user, identified by email
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_login_at: Option<NaiveDateTime>,
}

/// Input model for creating a new user
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
}

/// Trims and lower-cases an email address and checks its basic shape.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    let invalid = || {
        Error::Validation(ValidationError::InvalidInput(format!(
            "'{}' is not a valid email address",
            raw.trim()
        )))
    };

    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.') =>
        {
            Ok(email)
        }
        _ => Err(invalid()),
    }
}
