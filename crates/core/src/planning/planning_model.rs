//! Contribution plan output models.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::goals::{Frequency, MemberRole};

/// Time remaining until the target date.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Horizon {
    pub years: u32,
    pub months: u32,
    /// Contribution periods left, possibly fractional.
    pub total_periods: f64,
    pub n_per_year: u32,
}

/// The two ways of funding the goal.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanTotals {
    pub per_period: f64,
    pub lump_sum_now: f64,
}

/// One member's share of the per-period contribution.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberContribution {
    pub user_id: String,
    pub role: MemberRole,
    pub split_percent: Option<f64>,
    pub fixed_amount: Option<f64>,
    pub per_period: f64,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Advisory conditions detected while building a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanWarning {
    TargetDateReached,
    NoPeriodsRemaining,
    FixedExceedsRequired,
    PercentagesMissing,
    SplitsDoNotSumTo100,
    NoMembersForRemainder,
}

impl PlanWarning {
    pub fn message(&self) -> &'static str {
        match self {
            PlanWarning::TargetDateReached => {
                "The target date is today or already in the past."
            }
            PlanWarning::NoPeriodsRemaining => {
                "No contribution periods remain before the target date."
            }
            PlanWarning::FixedExceedsRequired => {
                "Fixed contributions exceed the required per-period amount; percentage-based members are not asked to contribute."
            }
            PlanWarning::PercentagesMissing => {
                "Percentage allocations are missing, so the remaining contribution is not assigned to anyone."
            }
            PlanWarning::SplitsDoNotSumTo100 => {
                "Split percentages do not sum to 100%; shares were scaled to their total."
            }
            PlanWarning::NoMembersForRemainder => {
                "No members available to receive the remaining contribution requirement."
            }
        }
    }
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for PlanWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Contribution plan for a goal. Computed on every request, never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalPlan {
    pub horizon: Horizon,
    pub totals: PlanTotals,
    pub members: Vec<MemberContribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<PlanWarning>>,
}

impl GoalPlan {
    pub fn has_warning(&self, warning: PlanWarning) -> bool {
        self.warnings
            .as_ref()
            .is_some_and(|w| w.contains(&warning))
    }
}

/// Reduced plan used by the goals dashboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub goal_id: String,
    pub title: String,
    pub role: MemberRole,
    pub target_amount: f64,
    pub target_date: DateTime<Utc>,
    pub existing_savings: f64,
    pub progress_percent: f64,
    pub contribution_amount: f64,
    pub contribution_frequency: Frequency,
    pub member_count: usize,
}
