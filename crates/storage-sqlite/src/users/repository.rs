use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use goalshare_core::users::{NewUser, User, UserRepositoryTrait};
use goalshare_core::Result;

use super::model::UserDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::users;

pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        UserRepository { pool, writer }
    }
}

fn load_user(conn: &mut SqliteConnection, user_id: &str) -> Result<User> {
    let user: UserDB = users::table
        .find(user_id)
        .select(UserDB::as_select())
        .first(conn)
        .into_core()?;
    Ok(user.into())
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        load_user(&mut conn, user_id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let user: Option<UserDB> = users::table
            .filter(users::email.eq(email))
            .select(UserDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?;
        Ok(user.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let row = UserDB {
                    id: Uuid::new_v4().to_string(),
                    email: new_user.email,
                    name: new_user.name,
                    created_at: Utc::now().naive_utc(),
                    last_login_at: None,
                };
                let inserted: UserDB = diesel::insert_into(users::table)
                    .values(&row)
                    .returning(UserDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Ok(inserted.into())
            })
            .await
    }

    async fn update_name(&self, user_id: String, name: Option<String>) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                diesel::update(users::table.find(&user_id))
                    .set(users::name.eq(name))
                    .execute(conn)
                    .into_core()?;
                load_user(conn, &user_id)
            })
            .await
    }

    async fn touch_last_login(&self, user_id: String) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                diesel::update(users::table.find(&user_id))
                    .set(users::last_login_at.eq(Some(Utc::now().naive_utc())))
                    .execute(conn)
                    .into_core()?;
                load_user(conn, &user_id)
            })
            .await
    }
}
