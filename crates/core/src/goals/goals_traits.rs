use crate::errors::Result;
use crate::goals::goals_model::{Goal, GoalUpdate, MemberRole, MemberSplitUpdate, NewGoal};
use crate::planning::{GoalPlan, GoalSummary};
use async_trait::async_trait;

/// Trait for goal repository operations
///
/// Goals are loaded as whole documents: the goal row plus its members in
/// insertion order, with each member's email and name filled in.
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    fn list_goals_for_user(&self, user_id: &str) -> Result<Vec<Goal>>;
    fn get_goal(&self, goal_id: &str) -> Result<Goal>;
    /// Inserts the goal together with its owner as first member, holding a 100% split.
    async fn insert_new_goal(&self, owner_id: String, new_goal: NewGoal) -> Result<Goal>;
    async fn update_goal(&self, goal_id: String, goal_update: GoalUpdate) -> Result<Goal>;
    async fn delete_goal(&self, goal_id: String) -> Result<usize>;
    async fn add_member(&self, goal_id: String, user_id: String, role: MemberRole)
        -> Result<Goal>;
    async fn remove_member(&self, goal_id: String, user_id: String) -> Result<usize>;
    async fn update_member_splits(
        &self,
        goal_id: String,
        splits: Vec<MemberSplitUpdate>,
    ) -> Result<usize>;
}

/// Trait for goal service operations
///
/// Every operation takes the id of the acting user and enforces membership
/// (for reads) or ownership (for changes).
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goal_summaries(&self, user_id: &str) -> Result<Vec<GoalSummary>>;
    fn get_goal(&self, user_id: &str, goal_id: &str) -> Result<Goal>;
    fn get_goal_plan(&self, user_id: &str, goal_id: &str) -> Result<GoalPlan>;
    async fn create_goal(&self, user_id: &str, new_goal: NewGoal) -> Result<Goal>;
    async fn update_goal(&self, user_id: &str, goal_id: &str, goal_update: GoalUpdate)
        -> Result<Goal>;
    async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<()>;
    async fn invite_member(&self, user_id: &str, goal_id: &str, email: &str) -> Result<Goal>;
    async fn remove_member(&self, user_id: &str, goal_id: &str, member_id: &str)
        -> Result<Goal>;
    async fn leave_goal(&self, user_id: &str, goal_id: &str) -> Result<()>;
    async fn update_member_splits(
        &self,
        user_id: &str,
        goal_id: &str,
        splits: Vec<MemberSplitUpdate>,
    ) -> Result<Goal>;
}
