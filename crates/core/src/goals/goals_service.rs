use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};

use crate::constants::{MAX_EXPECTED_RATE, MAX_GOAL_TITLE_LEN};
use crate::errors::{Error, Result, ValidationError};
use crate::goals::goals_model::{Goal, GoalUpdate, MemberRole, MemberSplitUpdate, NewGoal};
use crate::goals::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
use crate::planning::{build_goal_summary, build_plan, GoalPlan, GoalSummary};
use crate::users::UserServiceTrait;

pub struct GoalService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
    user_service: Arc<dyn UserServiceTrait>,
}

impl GoalService {
    pub fn new(
        goal_repo: Arc<dyn GoalRepositoryTrait>,
        user_service: Arc<dyn UserServiceTrait>,
    ) -> Self {
        GoalService {
            goal_repo,
            user_service,
        }
    }

    /// Loads a goal the user belongs to.
    ///
    /// Non-members get the same not-found error as for a missing goal so goal
    /// ids cannot be probed.
    fn load_for_member(&self, user_id: &str, goal_id: &str) -> Result<Goal> {
        let goal = self.goal_repo.get_goal(goal_id)?;
        if goal.member(user_id).is_none() {
            debug!("User {} is not a member of goal {}", user_id, goal_id);
            return Err(Error::not_found(format!("Goal {}", goal_id)));
        }
        Ok(goal)
    }

    fn load_for_owner(&self, user_id: &str, goal_id: &str) -> Result<Goal> {
        let goal = self.load_for_member(user_id, goal_id)?;
        if !goal.is_owner(user_id) {
            return Err(Error::PermissionDenied(
                "Only the goal owner can change this goal".to_string(),
            ));
        }
        Ok(goal)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::Validation(ValidationError::InvalidInput(message.into()))
}

fn validate_amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{} must be a non-negative number", field)));
    }
    Ok(())
}

fn validate_goal_fields(
    title: &str,
    target_amount: f64,
    expected_rate: f64,
    existing_savings: Option<f64>,
) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "title".to_string(),
        )));
    }
    if title.chars().count() > MAX_GOAL_TITLE_LEN {
        return Err(invalid(format!(
            "title must be at most {} characters",
            MAX_GOAL_TITLE_LEN
        )));
    }
    validate_amount("targetAmount", target_amount)?;
    if !expected_rate.is_finite() || !(0.0..=MAX_EXPECTED_RATE).contains(&expected_rate) {
        return Err(invalid(format!(
            "expectedRate must be between 0 and {}",
            MAX_EXPECTED_RATE
        )));
    }
    if let Some(existing) = existing_savings {
        validate_amount("existingSavings", existing)?;
    }
    Ok(())
}

fn validate_split(split: &MemberSplitUpdate) -> Result<()> {
    if let Some(percent) = split.split_percent {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(invalid("splitPercent must be between 0 and 100"));
        }
    }
    if let Some(fixed) = split.fixed_amount {
        validate_amount("fixedAmount", fixed)?;
    }
    Ok(())
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn get_goal_summaries(&self, user_id: &str) -> Result<Vec<GoalSummary>> {
        let now = Utc::now();
        let goals = self.goal_repo.list_goals_for_user(user_id)?;
        Ok(goals
            .iter()
            .filter_map(|goal| {
                goal.member(user_id)
                    .map(|member| build_goal_summary(goal, member.role, now))
            })
            .collect())
    }

    fn get_goal(&self, user_id: &str, goal_id: &str) -> Result<Goal> {
        self.load_for_member(user_id, goal_id)
    }

    fn get_goal_plan(&self, user_id: &str, goal_id: &str) -> Result<GoalPlan> {
        let goal = self.load_for_member(user_id, goal_id)?;
        Ok(build_plan(&goal, Utc::now()))
    }

    async fn create_goal(&self, user_id: &str, new_goal: NewGoal) -> Result<Goal> {
        validate_goal_fields(
            &new_goal.title,
            new_goal.target_amount,
            new_goal.expected_rate,
            new_goal.existing_savings,
        )?;
        let new_goal = NewGoal {
            title: new_goal.title.trim().to_string(),
            description: clean_description(new_goal.description),
            ..new_goal
        };

        let goal = self
            .goal_repo
            .insert_new_goal(user_id.to_string(), new_goal)
            .await?;
        info!("Goal {} created by user {}", goal.id, user_id);
        Ok(goal)
    }

    async fn update_goal(
        &self,
        user_id: &str,
        goal_id: &str,
        goal_update: GoalUpdate,
    ) -> Result<Goal> {
        self.load_for_owner(user_id, goal_id)?;
        validate_goal_fields(
            &goal_update.title,
            goal_update.target_amount,
            goal_update.expected_rate,
            goal_update.existing_savings,
        )?;
        let goal_update = GoalUpdate {
            title: goal_update.title.trim().to_string(),
            description: clean_description(goal_update.description),
            ..goal_update
        };
        self.goal_repo
            .update_goal(goal_id.to_string(), goal_update)
            .await
    }

    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<()> {
        self.load_for_owner(user_id, goal_id)?;
        self.goal_repo.delete_goal(goal_id.to_string()).await?;
        info!("Goal {} deleted by user {}", goal_id, user_id);
        Ok(())
    }

    async fn invite_member(&self, user_id: &str, goal_id: &str, email: &str) -> Result<Goal> {
        let goal = self.load_for_owner(user_id, goal_id)?;
        let invitee = self.user_service.find_or_create_by_email(email).await?;
        if goal.member(&invitee.id).is_some() {
            return Err(Error::ConstraintViolation(format!(
                "{} is already a member of this goal",
                invitee.email
            )));
        }

        debug!("Adding user {} to goal {}", invitee.id, goal_id);
        self.goal_repo
            .add_member(goal_id.to_string(), invitee.id, MemberRole::Collaborator)
            .await
    }

    async fn remove_member(&self, user_id: &str, goal_id: &str, member_id: &str) -> Result<Goal> {
        let goal = self.load_for_owner(user_id, goal_id)?;
        let member = goal
            .member(member_id)
            .ok_or_else(|| Error::not_found(format!("Member {}", member_id)))?;
        if member.role == MemberRole::Owner {
            return Err(Error::ConstraintViolation(
                "The goal owner cannot be removed".to_string(),
            ));
        }

        self.goal_repo
            .remove_member(goal_id.to_string(), member_id.to_string())
            .await?;
        self.goal_repo.get_goal(goal_id)
    }

    async fn leave_goal(&self, user_id: &str, goal_id: &str) -> Result<()> {
        let goal = self.load_for_member(user_id, goal_id)?;
        if goal.is_owner(user_id) {
            return Err(Error::ConstraintViolation(
                "The goal owner cannot leave; delete the goal instead".to_string(),
            ));
        }
        self.goal_repo
            .remove_member(goal_id.to_string(), user_id.to_string())
            .await?;
        Ok(())
    }

    async fn update_member_splits(
        &self,
        user_id: &str,
        goal_id: &str,
        splits: Vec<MemberSplitUpdate>,
    ) -> Result<Goal> {
        let goal = self.load_for_owner(user_id, goal_id)?;
        for split in &splits {
            validate_split(split)?;
            if goal.member(&split.user_id).is_none() {
                return Err(invalid(format!(
                    "User {} is not a member of this goal",
                    split.user_id
                )));
            }
        }

        self.goal_repo
            .update_member_splits(goal_id.to_string(), splits)
            .await?;
        self.goal_repo.get_goal(goal_id)
    }
}
