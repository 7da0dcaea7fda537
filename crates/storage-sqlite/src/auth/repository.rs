use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use goalshare_core::auth::{LoginCode, LoginCodeRepositoryTrait, NewLoginCode};
use goalshare_core::Result;

use super::model::LoginCodeDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::login_codes;

pub struct LoginCodeRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl LoginCodeRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        LoginCodeRepository { pool, writer }
    }
}

#[async_trait]
impl LoginCodeRepositoryTrait for LoginCodeRepository {
    async fn replace_login_code(&self, new_code: NewLoginCode) -> Result<LoginCode> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<LoginCode> {
                diesel::delete(login_codes::table.filter(login_codes::email.eq(&new_code.email)))
                    .execute(conn)
                    .into_core()?;

                let row = LoginCodeDB {
                    id: Uuid::new_v4().to_string(),
                    email: new_code.email,
                    code_hash: new_code.code_hash,
                    expires_at: new_code.expires_at,
                    attempts: 0,
                    consumed_at: None,
                    created_at: Utc::now().naive_utc(),
                };
                let inserted: LoginCodeDB = diesel::insert_into(login_codes::table)
                    .values(&row)
                    .returning(LoginCodeDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(inserted.into())
            })
            .await
    }

    fn find_active_code(&self, email: &str, now: NaiveDateTime) -> Result<Option<LoginCode>> {
        let mut conn = get_connection(&self.pool)?;
        let code: Option<LoginCodeDB> = login_codes::table
            .filter(login_codes::email.eq(email))
            .filter(login_codes::consumed_at.is_null())
            .filter(login_codes::expires_at.gt(now))
            .order(login_codes::created_at.desc())
            .select(LoginCodeDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?;
        Ok(code.map(LoginCode::from))
    }

    async fn record_failed_attempt(&self, code_id: String) -> Result<LoginCode> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<LoginCode> {
                let updated: LoginCodeDB = diesel::update(login_codes::table.find(&code_id))
                    .set(login_codes::attempts.eq(login_codes::attempts + 1))
                    .returning(LoginCodeDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(updated.into())
            })
            .await
    }

    async fn consume_code(&self, code_id: String) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(login_codes::table.find(&code_id))
                    .set(login_codes::consumed_at.eq(Some(Utc::now().naive_utc())))
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    async fn delete_expired_codes(&self, now: NaiveDateTime) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(
                    login_codes::table.filter(
                        login_codes::expires_at
                            .le(now)
                            .or(login_codes::consumed_at.is_not_null()),
                    ),
                )
                .execute(conn)
                .into_core()
            })
            .await
    }
}
