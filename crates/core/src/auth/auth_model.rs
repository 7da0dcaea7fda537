use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A stored one-time login code.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginCode {
    pub id: String,
    pub email: String,
    pub code_hash: String,
    pub expires_at: NaiveDateTime,
    pub attempts: i32,
    pub consumed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl LoginCode {
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone)]
pub struct NewLoginCode {
    pub email: String,
    pub code_hash: String,
    pub expires_at: NaiveDateTime,
}

/// Returned to the caller after a code was sent. Never contains the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCodeIssued {
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Hex encoded SHA-256 of `email:code`.
///
/// Binding the email into the hash keeps identical codes issued to different
/// addresses distinct.
pub fn hash_login_code(email: &str, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}
