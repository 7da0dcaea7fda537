//! Unit tests for the goal service.

use super::*;
use crate::errors::{DatabaseError, Error, Result};
use crate::planning::PlanWarning;
use crate::users::{NewUser, User, UserRepositoryTrait, UserService};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::{Arc, RwLock};

// ============================================================================
// Mock Implementations
// ============================================================================

#[derive(Default)]
struct MockUserRepository {
    users: RwLock<Vec<User>>,
}

impl MockUserRepository {
    fn with_users(emails: &[&str]) -> Self {
        let users = emails
            .iter()
            .enumerate()
            .map(|(i, email)| User {
                id: format!("user-{}", i + 1),
                email: email.to_string(),
                name: None,
                created_at: Utc::now().naive_utc(),
                last_login_at: None,
            })
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl UserRepositoryTrait for MockUserRepository {
    fn get_by_id(&self, user_id: &str) -> Result<User> {
        self.users
            .read()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("User {}", user_id)))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut users = self.users.write().unwrap();
        let user = User {
            id: format!("user-{}", users.len() + 1),
            email: new_user.email,
            name: new_user.name,
            created_at: Utc::now().naive_utc(),
            last_login_at: None,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_name(&self, _user_id: String, _name: Option<String>) -> Result<User> {
        unimplemented!()
    }

    async fn touch_last_login(&self, _user_id: String) -> Result<User> {
        unimplemented!()
    }
}

struct MockGoalRepository {
    goals: RwLock<Vec<Goal>>,
    users: Arc<MockUserRepository>,
}

impl MockGoalRepository {
    fn new(users: Arc<MockUserRepository>) -> Self {
        Self {
            goals: RwLock::new(Vec::new()),
            users,
        }
    }

    fn member_for(&self, user_id: &str, role: MemberRole, split: Option<f64>) -> GoalMember {
        let user = self.users.get_by_id(user_id).ok();
        GoalMember {
            user_id: user_id.to_string(),
            role,
            split_percent: split,
            fixed_amount: None,
            email: user.as_ref().map(|u| u.email.clone()),
            name: user.and_then(|u| u.name),
        }
    }
}

#[async_trait]
impl GoalRepositoryTrait for MockGoalRepository {
    fn list_goals_for_user(&self, user_id: &str) -> Result<Vec<Goal>> {
        Ok(self
            .goals
            .read()
            .unwrap()
            .iter()
            .filter(|g| g.member(user_id).is_some())
            .cloned()
            .collect())
    }

    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        self.goals
            .read()
            .unwrap()
            .iter()
            .find(|g| g.id == goal_id)
            .cloned()
            .ok_or_else(|| Error::Database(DatabaseError::NotFound("Record not found".into())))
    }

    async fn insert_new_goal(&self, owner_id: String, new_goal: NewGoal) -> Result<Goal> {
        let owner = self.member_for(&owner_id, MemberRole::Owner, Some(100.0));
        let mut goals = self.goals.write().unwrap();
        let now = Utc::now().naive_utc();
        let goal = Goal {
            id: format!("goal-{}", goals.len() + 1),
            owner_id,
            title: new_goal.title,
            description: new_goal.description,
            target_amount: new_goal.target_amount,
            target_date: new_goal.target_date,
            expected_rate: new_goal.expected_rate,
            compounding: new_goal.compounding,
            contribution_frequency: new_goal.contribution_frequency,
            existing_savings: new_goal.existing_savings,
            members: vec![owner],
            created_at: now,
            updated_at: now,
        };
        goals.push(goal.clone());
        Ok(goal)
    }

    async fn update_goal(&self, goal_id: String, goal_update: GoalUpdate) -> Result<Goal> {
        let mut goals = self.goals.write().unwrap();
        let goal = goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| Error::not_found(goal_id.clone()))?;
        goal.title = goal_update.title;
        goal.description = goal_update.description;
        goal.target_amount = goal_update.target_amount;
        goal.target_date = goal_update.target_date;
        goal.expected_rate = goal_update.expected_rate;
        goal.compounding = goal_update.compounding;
        goal.contribution_frequency = goal_update.contribution_frequency;
        goal.existing_savings = goal_update.existing_savings;
        Ok(goal.clone())
    }

    async fn delete_goal(&self, goal_id: String) -> Result<usize> {
        let mut goals = self.goals.write().unwrap();
        let before = goals.len();
        goals.retain(|g| g.id != goal_id);
        Ok(before - goals.len())
    }

    async fn add_member(
        &self,
        goal_id: String,
        user_id: String,
        role: MemberRole,
    ) -> Result<Goal> {
        let member = self.member_for(&user_id, role, None);
        let mut goals = self.goals.write().unwrap();
        let goal = goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| Error::not_found(goal_id.clone()))?;
        goal.members.push(member);
        Ok(goal.clone())
    }

    async fn remove_member(&self, goal_id: String, user_id: String) -> Result<usize> {
        let mut goals = self.goals.write().unwrap();
        let goal = goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| Error::not_found(goal_id.clone()))?;
        let before = goal.members.len();
        goal.members.retain(|m| m.user_id != user_id);
        Ok(before - goal.members.len())
    }

    async fn update_member_splits(
        &self,
        goal_id: String,
        splits: Vec<MemberSplitUpdate>,
    ) -> Result<usize> {
        let mut goals = self.goals.write().unwrap();
        let goal = goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| Error::not_found(goal_id.clone()))?;
        let mut updated = 0;
        for split in splits {
            if let Some(m) = goal.members.iter_mut().find(|m| m.user_id == split.user_id) {
                m.split_percent = split.split_percent;
                m.fixed_amount = split.fixed_amount;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

// ============================================================================
// Helpers
// ============================================================================

const OWNER: &str = "user-1";
const FRIEND: &str = "user-2";

fn create_service() -> GoalService {
    let users = Arc::new(MockUserRepository::with_users(&[
        "owner@example.com",
        "friend@example.com",
    ]));
    let goal_repo = Arc::new(MockGoalRepository::new(users.clone()));
    let user_service = Arc::new(UserService::new(users));
    GoalService::new(goal_repo, user_service)
}

fn new_goal(title: &str, target_amount: f64) -> NewGoal {
    NewGoal {
        title: title.to_string(),
        description: Some("  ".to_string()),
        target_amount,
        target_date: Utc::now() + Duration::days(730),
        expected_rate: 4.0,
        compounding: Frequency::Monthly,
        contribution_frequency: Frequency::Monthly,
        existing_savings: Some(1000.0),
    }
}

fn goal_update_from(goal: &Goal) -> GoalUpdate {
    GoalUpdate {
        title: goal.title.clone(),
        description: goal.description.clone(),
        target_amount: goal.target_amount,
        target_date: goal.target_date,
        expected_rate: goal.expected_rate,
        compounding: goal.compounding,
        contribution_frequency: goal.contribution_frequency,
        existing_savings: goal.existing_savings,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_create_goal_makes_creator_owner() {
    let service = create_service();

    let goal = service
        .create_goal(OWNER, new_goal("  Trip to Japan ", 10_000.0))
        .await
        .unwrap();

    assert_eq!(goal.title, "Trip to Japan");
    assert_eq!(goal.description, None);
    assert_eq!(goal.owner_id, OWNER);
    assert_eq!(goal.members.len(), 1);
    assert_eq!(goal.members[0].role, MemberRole::Owner);
    assert_eq!(goal.members[0].split_percent, Some(100.0));
}

#[tokio::test]
async fn test_create_goal_rejects_invalid_input() {
    let service = create_service();

    let cases = vec![
        new_goal("", 100.0),
        new_goal("Bike", -1.0),
        new_goal("Bike", f64::NAN),
        NewGoal {
            expected_rate: 150.0,
            ..new_goal("Bike", 100.0)
        },
        NewGoal {
            existing_savings: Some(-5.0),
            ..new_goal("Bike", 100.0)
        },
        new_goal(&"x".repeat(121), 100.0),
    ];
    for case in cases {
        let result = service.create_goal(OWNER, case).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}

#[tokio::test]
async fn test_non_member_cannot_see_goal() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();

    let result = service.get_goal(FRIEND, &goal.id);
    assert!(result.unwrap_err().is_not_found());

    let plan = service.get_goal_plan(FRIEND, &goal.id);
    assert!(plan.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_invite_member_adds_collaborator() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();

    let updated = service
        .invite_member(OWNER, &goal.id, " Friend@Example.com ")
        .await
        .unwrap();

    assert_eq!(updated.members.len(), 2);
    assert_eq!(updated.members[1].user_id, FRIEND);
    assert_eq!(updated.members[1].role, MemberRole::Collaborator);
    assert!(service.get_goal(FRIEND, &goal.id).is_ok());
}

#[tokio::test]
async fn test_invite_unknown_email_creates_user() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();

    let updated = service
        .invite_member(OWNER, &goal.id, "newcomer@example.com")
        .await
        .unwrap();

    assert_eq!(
        updated.members[1].email.as_deref(),
        Some("newcomer@example.com")
    );
}

#[tokio::test]
async fn test_invite_existing_member_is_rejected() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();
    service
        .invite_member(OWNER, &goal.id, "friend@example.com")
        .await
        .unwrap();

    let again = service
        .invite_member(OWNER, &goal.id, "friend@example.com")
        .await;
    assert!(matches!(again, Err(Error::ConstraintViolation(_))));

    let owner_again = service
        .invite_member(OWNER, &goal.id, "owner@example.com")
        .await;
    assert!(matches!(owner_again, Err(Error::ConstraintViolation(_))));
}

#[tokio::test]
async fn test_collaborator_cannot_change_goal() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();
    service
        .invite_member(OWNER, &goal.id, "friend@example.com")
        .await
        .unwrap();

    let update = service
        .update_goal(FRIEND, &goal.id, goal_update_from(&goal))
        .await;
    assert!(matches!(update, Err(Error::PermissionDenied(_))));

    let delete = service.delete_goal(FRIEND, &goal.id).await;
    assert!(matches!(delete, Err(Error::PermissionDenied(_))));

    let invite = service
        .invite_member(FRIEND, &goal.id, "third@example.com")
        .await;
    assert!(matches!(invite, Err(Error::PermissionDenied(_))));
}

#[tokio::test]
async fn test_owner_updates_goal() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();

    let mut update = goal_update_from(&goal);
    update.target_amount = 8000.0;
    update.contribution_frequency = Frequency::Yearly;
    let updated = service.update_goal(OWNER, &goal.id, update).await.unwrap();

    assert_eq!(updated.target_amount, 8000.0);
    assert_eq!(updated.contribution_frequency, Frequency::Yearly);
}

#[tokio::test]
async fn test_owner_cannot_be_removed_or_leave() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();

    let removed = service.remove_member(OWNER, &goal.id, OWNER).await;
    assert!(matches!(removed, Err(Error::ConstraintViolation(_))));

    let left = service.leave_goal(OWNER, &goal.id).await;
    assert!(matches!(left, Err(Error::ConstraintViolation(_))));
}

#[tokio::test]
async fn test_collaborator_leaves_and_is_removed() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();
    service
        .invite_member(OWNER, &goal.id, "friend@example.com")
        .await
        .unwrap();

    service.leave_goal(FRIEND, &goal.id).await.unwrap();
    assert!(service.get_goal(FRIEND, &goal.id).is_err());

    service
        .invite_member(OWNER, &goal.id, "friend@example.com")
        .await
        .unwrap();
    let updated = service
        .remove_member(OWNER, &goal.id, FRIEND)
        .await
        .unwrap();
    assert_eq!(updated.members.len(), 1);
}

#[tokio::test]
async fn test_update_member_splits_feeds_plan() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();
    service
        .invite_member(OWNER, &goal.id, "friend@example.com")
        .await
        .unwrap();

    service
        .update_member_splits(
            OWNER,
            &goal.id,
            vec![
                MemberSplitUpdate {
                    user_id: OWNER.to_string(),
                    split_percent: Some(30.0),
                    fixed_amount: None,
                },
                MemberSplitUpdate {
                    user_id: FRIEND.to_string(),
                    split_percent: Some(40.0),
                    fixed_amount: None,
                },
            ],
        )
        .await
        .unwrap();

    let plan = service.get_goal_plan(FRIEND, &goal.id).unwrap();
    assert_eq!(plan.warnings, Some(vec![PlanWarning::SplitsDoNotSumTo100]));
    let ratio = plan.members[1].per_period / plan.members[0].per_period;
    assert!((ratio - 4.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_update_member_splits_validates() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();

    let out_of_range = service
        .update_member_splits(
            OWNER,
            &goal.id,
            vec![MemberSplitUpdate {
                user_id: OWNER.to_string(),
                split_percent: Some(120.0),
                fixed_amount: None,
            }],
        )
        .await;
    assert!(matches!(out_of_range, Err(Error::Validation(_))));

    let stranger = service
        .update_member_splits(
            OWNER,
            &goal.id,
            vec![MemberSplitUpdate {
                user_id: "nobody".to_string(),
                split_percent: Some(10.0),
                fixed_amount: None,
            }],
        )
        .await;
    assert!(matches!(stranger, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_goal_summaries_only_list_memberships() {
    let service = create_service();
    service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();
    let shared = service
        .create_goal(OWNER, new_goal("Holiday", 2000.0))
        .await
        .unwrap();
    service
        .invite_member(OWNER, &shared.id, "friend@example.com")
        .await
        .unwrap();

    let owner_view = service.get_goal_summaries(OWNER).unwrap();
    assert_eq!(owner_view.len(), 2);
    assert!(owner_view.iter().all(|s| s.role == MemberRole::Owner));

    let friend_view = service.get_goal_summaries(FRIEND).unwrap();
    assert_eq!(friend_view.len(), 1);
    assert_eq!(friend_view[0].goal_id, shared.id);
    assert_eq!(friend_view[0].role, MemberRole::Collaborator);
    assert!((friend_view[0].progress_percent - 50.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_delete_goal() {
    let service = create_service();
    let goal = service
        .create_goal(OWNER, new_goal("Car", 5000.0))
        .await
        .unwrap();

    service.delete_goal(OWNER, &goal.id).await.unwrap();

    assert!(service.get_goal(OWNER, &goal.id).unwrap_err().is_not_found());
}
