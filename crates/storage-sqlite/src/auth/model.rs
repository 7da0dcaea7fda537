//! Database models for login codes.

use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::login_codes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LoginCodeDB {
    pub id: String,
    pub email: String,
    pub code_hash: String,
    pub expires_at: NaiveDateTime,
    pub attempts: i32,
    pub consumed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl From<LoginCodeDB> for goalshare_core::auth::LoginCode {
    fn from(db: LoginCodeDB) -> Self {
        Self {
            id: db.id,
            email: db.email,
            code_hash: db.code_hash,
            expires_at: db.expires_at,
            attempts: db.attempts,
            consumed_at: db.consumed_at,
            created_at: db.created_at,
        }
    }
}
