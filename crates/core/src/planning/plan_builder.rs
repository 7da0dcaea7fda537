//! Builds contribution plans and dashboard summaries from goals.

use chrono::{DateTime, Utc};

use super::financial::{
    net_target_after_existing, required_lump_sum_for_future_value,
    required_payment_for_future_value, year_fraction,
};
use super::planning_model::{
    GoalPlan, GoalSummary, Horizon, MemberContribution, PlanTotals, PlanWarning,
};
use crate::constants::{ALLOCATION_EPSILON, SPLIT_SUM_TOLERANCE};
use crate::goals::{Goal, GoalMember, MemberRole};

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn fixed_amount_of(member: &GoalMember) -> Option<f64> {
    member.fixed_amount.map(|amount| finite_or_zero(amount).max(0.0))
}

fn split_percent_of(member: &GoalMember) -> f64 {
    finite_or_zero(member.split_percent.unwrap_or(0.0)).clamp(0.0, 100.0)
}

/// Raw totals shared by the full plan and the summary.
struct PlanCore {
    raw_years: f64,
    t_years: f64,
    total_per_period: f64,
    lump_sum_now: f64,
}

fn compute_core(goal: &Goal, now: DateTime<Utc>) -> PlanCore {
    let compounding_n = goal.compounding.periods_per_year();
    let contribution_n = goal.contribution_frequency.periods_per_year();
    let target_amount = finite_or_zero(goal.target_amount);
    let expected_rate = finite_or_zero(goal.expected_rate);
    let existing = goal.existing_savings.map(finite_or_zero).unwrap_or(0.0);

    let raw_years = year_fraction(now, goal.target_date);
    let t_years = if raw_years.is_finite() {
        raw_years.max(0.0)
    } else {
        0.0
    };

    let net_future_value =
        net_target_after_existing(target_amount, existing, expected_rate, compounding_n, t_years);
    let total_per_period = required_payment_for_future_value(
        net_future_value,
        expected_rate,
        contribution_n,
        t_years,
    );
    let lump_sum_now = required_lump_sum_for_future_value(
        net_future_value,
        expected_rate,
        compounding_n,
        t_years,
    );

    PlanCore {
        raw_years,
        t_years,
        total_per_period,
        lump_sum_now,
    }
}

/// Splits `total_per_period` between members.
///
/// Fixed amounts are carved out first; the remainder is shared by the other
/// members in proportion to their split percentages, normalized to the
/// actual sum. A non-finite total is never distributed.
fn allocate_members(
    members: &[GoalMember],
    total_per_period: f64,
    warnings: &mut Vec<PlanWarning>,
) -> Vec<MemberContribution> {
    let total_is_finite = total_per_period.is_finite();

    let mut contributions: Vec<MemberContribution> = members
        .iter()
        .map(|m| MemberContribution {
            user_id: m.user_id.clone(),
            role: m.role,
            split_percent: m.split_percent,
            fixed_amount: m.fixed_amount,
            per_period: 0.0,
            email: m.email.clone(),
            name: m.name.clone(),
        })
        .collect();

    let mut fixed_total = 0.0;
    let mut percent_eligible = Vec::new();
    for (idx, member) in members.iter().enumerate() {
        match fixed_amount_of(member) {
            Some(amount) => {
                contributions[idx].per_period = amount;
                fixed_total += amount;
            }
            None => percent_eligible.push(idx),
        }
    }

    let mut remaining = total_per_period - fixed_total;
    if total_is_finite && remaining < -ALLOCATION_EPSILON {
        warnings.push(PlanWarning::FixedExceedsRequired);
        remaining = 0.0;
    }
    // An unknown total is treated as still needing contributions.
    let remainder_outstanding = !total_is_finite || remaining > 0.0;

    if percent_eligible.is_empty() {
        if remainder_outstanding {
            warnings.push(PlanWarning::NoMembersForRemainder);
        }
        return contributions;
    }

    let percent_sum: f64 = percent_eligible
        .iter()
        .map(|&idx| split_percent_of(&members[idx]))
        .sum();

    if percent_sum <= ALLOCATION_EPSILON {
        if remainder_outstanding {
            warnings.push(PlanWarning::PercentagesMissing);
        }
        return contributions;
    }

    if total_is_finite {
        let distributable = remaining.max(0.0);
        for &idx in &percent_eligible {
            let share = split_percent_of(&members[idx]) / percent_sum;
            contributions[idx].per_period += distributable * share;
        }
    }
    if (percent_sum - 100.0).abs() > SPLIT_SUM_TOLERANCE {
        warnings.push(PlanWarning::SplitsDoNotSumTo100);
    }

    contributions
}

fn build_horizon(t_years: f64, n_per_year: u32) -> Horizon {
    let total_months = t_years * 12.0;
    let mut years = (total_months / 12.0).floor();
    let mut months = (total_months - years * 12.0).round();
    if months >= 12.0 {
        years += 1.0;
        months = 0.0;
    }

    Horizon {
        // Float-to-int casts saturate, so absurd horizons cap at u32::MAX.
        years: years.min(f64::from(u32::MAX)) as u32,
        months: months as u32,
        total_periods: t_years * f64::from(n_per_year),
        n_per_year,
    }
}

/// Builds the contribution plan for `goal` as seen at `now`.
///
/// Pure and total: degenerate inputs (past target date, zero rate,
/// over-committed fixed amounts, missing splits, no members) yield finite
/// amounts plus warnings. Every amount in the result is finite.
pub fn build_plan(goal: &Goal, now: DateTime<Utc>) -> GoalPlan {
    let core = compute_core(goal, now);
    let contribution_n = goal.contribution_frequency.periods_per_year();

    let mut warnings = Vec::new();
    if !(core.raw_years > 0.0) {
        warnings.push(PlanWarning::TargetDateReached);
    }
    if !core.total_per_period.is_finite() {
        warnings.push(PlanWarning::NoPeriodsRemaining);
    }

    let mut members = allocate_members(&goal.members, core.total_per_period, &mut warnings);
    for member in &mut members {
        member.per_period = finite_or_zero(member.per_period);
    }

    GoalPlan {
        horizon: build_horizon(core.t_years, contribution_n),
        totals: PlanTotals {
            per_period: finite_or_zero(core.total_per_period),
            lump_sum_now: finite_or_zero(core.lump_sum_now),
        },
        members,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
    }
}

/// Builds the dashboard summary of `goal` for a member with `role`.
///
/// Uses the same arithmetic as [`build_plan`] but skips member allocation.
pub fn build_goal_summary(goal: &Goal, role: MemberRole, now: DateTime<Utc>) -> GoalSummary {
    let core = compute_core(goal, now);
    let target_amount = finite_or_zero(goal.target_amount);
    let existing_savings = goal.existing_savings.map(finite_or_zero).unwrap_or(0.0);

    let progress_percent = if target_amount > 0.0 {
        (existing_savings / target_amount * 100.0).clamp(0.0, 100.0)
    } else {
        100.0
    };

    GoalSummary {
        goal_id: goal.id.clone(),
        title: goal.title.clone(),
        role,
        target_amount,
        target_date: goal.target_date,
        existing_savings,
        progress_percent,
        contribution_amount: finite_or_zero(core.total_per_period),
        contribution_frequency: goal.contribution_frequency,
        member_count: goal.members.len(),
    }
}
