use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use goalshare_core::goals::{
    Goal, GoalRepositoryTrait, GoalUpdate, MemberRole, MemberSplitUpdate, NewGoal,
};
use goalshare_core::{Error, Result};

use super::model::{GoalChangesDB, GoalDB, GoalMemberDB, MemberRow};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{goal_members, goals, users};

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }
}

/// Loads one goal with its members in position order.
fn load_goal(conn: &mut SqliteConnection, goal_id: &str) -> Result<Goal> {
    let goal_db: GoalDB = goals::table
        .find(goal_id)
        .select(GoalDB::as_select())
        .first(conn)
        .into_core()?;

    let members: Vec<MemberRow> = goal_members::table
        .inner_join(users::table)
        .filter(goal_members::goal_id.eq(goal_id))
        .order(goal_members::position.asc())
        .select((GoalMemberDB::as_select(), users::email, users::name))
        .load(conn)
        .into_core()?;

    goal_db.into_domain(members)
}

/// Loads every goal `user_id` belongs to, newest first, with two queries.
fn load_goals_for_member(conn: &mut SqliteConnection, user_id: &str) -> Result<Vec<Goal>> {
    let memberships = goal_members::table
        .filter(goal_members::user_id.eq(user_id))
        .select(goal_members::goal_id);

    let goal_rows: Vec<GoalDB> = goals::table
        .filter(goals::id.eq_any(memberships))
        .order((goals::created_at.desc(), goals::id.asc()))
        .select(GoalDB::as_select())
        .load(conn)
        .into_core()?;

    // The subselect reads `goal_members` again, so it needs an alias to type-check.
    let gm = diesel::alias!(goal_members as gm);
    let alias_memberships = gm
        .filter(gm.field(goal_members::user_id).eq(user_id))
        .select(gm.field(goal_members::goal_id));

    let member_rows: Vec<MemberRow> = goal_members::table
        .inner_join(users::table)
        .filter(goal_members::goal_id.eq_any(alias_memberships))
        .order((goal_members::goal_id.asc(), goal_members::position.asc()))
        .select((GoalMemberDB::as_select(), users::email, users::name))
        .load(conn)
        .into_core()?;

    let mut members_by_goal: HashMap<String, Vec<MemberRow>> = HashMap::new();
    for row in member_rows {
        members_by_goal
            .entry(row.0.goal_id.clone())
            .or_default()
            .push(row);
    }

    goal_rows
        .into_iter()
        .map(|goal_db| {
            let members = members_by_goal.remove(&goal_db.id).unwrap_or_default();
            goal_db.into_domain(members)
        })
        .collect()
}

fn touch_goal(conn: &mut SqliteConnection, goal_id: &str, now: NaiveDateTime) -> Result<usize> {
    diesel::update(goals::table.find(goal_id))
        .set(goals::updated_at.eq(now))
        .execute(conn)
        .into_core()
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn list_goals_for_user(&self, user_id: &str) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        load_goals_for_member(&mut conn, user_id)
    }

    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;
        load_goal(&mut conn, goal_id)
    }

    async fn insert_new_goal(&self, owner_id: String, new_goal: NewGoal) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let now = Utc::now().naive_utc();
                let goal_db = GoalDB {
                    id: Uuid::new_v4().to_string(),
                    owner_id: owner_id.clone(),
                    title: new_goal.title,
                    description: new_goal.description,
                    target_amount: new_goal.target_amount,
                    target_date: new_goal.target_date.naive_utc(),
                    expected_rate: new_goal.expected_rate,
                    compounding: new_goal.compounding.as_str().to_string(),
                    contribution_frequency: new_goal.contribution_frequency.as_str().to_string(),
                    existing_savings: new_goal.existing_savings,
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(goals::table)
                    .values(&goal_db)
                    .execute(conn)
                    .into_core()?;

                let owner = GoalMemberDB {
                    goal_id: goal_db.id.clone(),
                    user_id: owner_id,
                    role: MemberRole::Owner.as_str().to_string(),
                    split_percent: Some(100.0),
                    fixed_amount: None,
                    position: 0,
                    created_at: now,
                };
                diesel::insert_into(goal_members::table)
                    .values(&owner)
                    .execute(conn)
                    .into_core()?;

                load_goal(conn, &goal_db.id)
            })
            .await
    }

    async fn update_goal(&self, goal_id: String, goal_update: GoalUpdate) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let changes = GoalChangesDB::from_update(goal_update, Utc::now().naive_utc());
                let updated = diesel::update(goals::table.find(&goal_id))
                    .set(&changes)
                    .execute(conn)
                    .into_core()?;
                if updated == 0 {
                    return Err(Error::not_found(format!("Goal {}", goal_id)));
                }
                load_goal(conn, &goal_id)
            })
            .await
    }

    async fn delete_goal(&self, goal_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(goal_members::table.filter(goal_members::goal_id.eq(&goal_id)))
                    .execute(conn)
                    .into_core()?;
                diesel::delete(goals::table.find(&goal_id))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    async fn add_member(
        &self,
        goal_id: String,
        user_id: String,
        role: MemberRole,
    ) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let last_position: Option<i32> = goal_members::table
                    .filter(goal_members::goal_id.eq(&goal_id))
                    .select(max(goal_members::position))
                    .first(conn)
                    .into_core()?;
                let now = Utc::now().naive_utc();

                let member = GoalMemberDB {
                    goal_id: goal_id.clone(),
                    user_id,
                    role: role.as_str().to_string(),
                    split_percent: None,
                    fixed_amount: None,
                    position: last_position.map_or(0, |p| p + 1),
                    created_at: now,
                };
                diesel::insert_into(goal_members::table)
                    .values(&member)
                    .execute(conn)
                    .into_core()?;
                touch_goal(conn, &goal_id, now)?;

                load_goal(conn, &goal_id)
            })
            .await
    }

    async fn remove_member(&self, goal_id: String, user_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let removed = diesel::delete(
                    goal_members::table
                        .filter(goal_members::goal_id.eq(&goal_id))
                        .filter(goal_members::user_id.eq(&user_id)),
                )
                .execute(conn)
                .into_core()?;
                if removed > 0 {
                    touch_goal(conn, &goal_id, Utc::now().naive_utc())?;
                }
                Ok(removed)
            })
            .await
    }

    async fn update_member_splits(
        &self,
        goal_id: String,
        splits: Vec<MemberSplitUpdate>,
    ) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected = 0;
                for split in splits {
                    affected += diesel::update(
                        goal_members::table
                            .filter(goal_members::goal_id.eq(&goal_id))
                            .filter(goal_members::user_id.eq(&split.user_id)),
                    )
                    .set((
                        goal_members::split_percent.eq(split.split_percent),
                        goal_members::fixed_amount.eq(split.fixed_amount),
                    ))
                    .execute(conn)
                    .into_core()?;
                }
                touch_goal(conn, &goal_id, Utc::now().naive_utc())?;
                debug!("Updated {} member splits on goal {}", affected, goal_id);
                Ok(affected)
            })
            .await
    }
}
