//! Goals domain models.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ValidationError};

/// How often something happens within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Monthly => 12,
            Frequency::Yearly => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown frequency '{}'",
                other
            )))),
        }
    }
}

/// Role of a member within a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Collaborator,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Collaborator => "collaborator",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(MemberRole::Owner),
            "collaborator" => Ok(MemberRole::Collaborator),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown member role '{}'",
                other
            )))),
        }
    }
}

/// A user taking part in a goal, with their contribution split configuration.
///
/// `fixed_amount` wins over `split_percent`: a member with a fixed amount is
/// never part of the percentage allocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalMember {
    pub user_id: String,
    pub role: MemberRole,
    pub split_percent: Option<f64>,
    pub fixed_amount: Option<f64>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Domain model representing a shared savings goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: f64,
    pub target_date: DateTime<Utc>,
    pub expected_rate: f64,
    pub compounding: Frequency,
    pub contribution_frequency: Frequency,
    pub existing_savings: Option<f64>,
    pub members: Vec<GoalMember>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Goal {
    pub fn member(&self, user_id: &str) -> Option<&GoalMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Input model for creating a new goal
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub target_amount: f64,
    pub target_date: DateTime<Utc>,
    #[serde(default)]
    pub expected_rate: f64,
    #[serde(default)]
    pub compounding: Frequency,
    #[serde(default)]
    pub contribution_frequency: Frequency,
    pub existing_savings: Option<f64>,
}

/// Input model for replacing the financial parameters of a goal
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub title: String,
    pub description: Option<String>,
    pub target_amount: f64,
    pub target_date: DateTime<Utc>,
    pub expected_rate: f64,
    pub compounding: Frequency,
    pub contribution_frequency: Frequency,
    pub existing_savings: Option<f64>,
}

/// New split configuration for one member of a goal
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberSplitUpdate {
    pub user_id: String,
    pub split_percent: Option<f64>,
    pub fixed_amount: Option<f64>,
}
