//! Database models for goals.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use goalshare_core::goals::{Frequency, Goal, GoalMember, GoalUpdate, MemberRole};
use goalshare_core::Result;

/// Database model for goals
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDB {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: f64,
    pub target_date: NaiveDateTime,
    pub expected_rate: f64,
    pub compounding: String,
    pub contribution_frequency: String,
    pub existing_savings: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Editable goal columns. `None` clears nullable columns.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(treat_none_as_null = true)]
pub struct GoalChangesDB {
    pub title: String,
    pub description: Option<String>,
    pub target_amount: f64,
    pub target_date: NaiveDateTime,
    pub expected_rate: f64,
    pub compounding: String,
    pub contribution_frequency: String,
    pub existing_savings: Option<f64>,
    pub updated_at: NaiveDateTime,
}

impl GoalChangesDB {
    pub fn from_update(update: GoalUpdate, updated_at: NaiveDateTime) -> Self {
        Self {
            title: update.title,
            description: update.description,
            target_amount: update.target_amount,
            target_date: update.target_date.naive_utc(),
            expected_rate: update.expected_rate,
            compounding: update.compounding.as_str().to_string(),
            contribution_frequency: update.contribution_frequency.as_str().to_string(),
            existing_savings: update.existing_savings,
            updated_at,
        }
    }
}

/// Database model for goal members
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::goal_members)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalMemberDB {
    pub goal_id: String,
    pub user_id: String,
    pub role: String,
    pub split_percent: Option<f64>,
    pub fixed_amount: Option<f64>,
    pub position: i32,
    pub created_at: NaiveDateTime,
}

/// A member row joined with the member's email and name.
pub type MemberRow = (GoalMemberDB, String, Option<String>);

impl GoalMemberDB {
    pub fn into_domain(self, email: String, name: Option<String>) -> Result<GoalMember> {
        Ok(GoalMember {
            user_id: self.user_id,
            role: MemberRole::from_str(&self.role)?,
            split_percent: self.split_percent,
            fixed_amount: self.fixed_amount,
            email: Some(email),
            name,
        })
    }
}

impl GoalDB {
    /// Builds the goal document from the row and its already ordered members.
    pub fn into_domain(self, members: Vec<MemberRow>) -> Result<Goal> {
        let members = members
            .into_iter()
            .map(|(member, email, name)| member.into_domain(email, name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Goal {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            target_amount: self.target_amount,
            target_date: self.target_date.and_utc(),
            expected_rate: self.expected_rate,
            compounding: Frequency::from_str(&self.compounding)?,
            contribution_frequency: Frequency::from_str(&self.contribution_frequency)?,
            existing_savings: self.existing_savings,
            members,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
