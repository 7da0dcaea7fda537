//! Planning module - contribution planner for shared savings goals.

pub mod financial;
mod plan_builder;
mod planning_model;


pub use plan_builder::{build_goal_summary, build_plan};
pub use planning_model::{
    GoalPlan, GoalSummary, Horizon, MemberContribution, PlanTotals, PlanWarning,
};
