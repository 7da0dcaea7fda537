use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use goalshare_core::goals::{Goal, GoalUpdate, MemberSplitUpdate, NewGoal};
use goalshare_core::planning::{GoalPlan, GoalSummary};

use crate::{
    auth::AuthenticatedUser, error::ApiResult, main_lib::AppState, models::InviteMemberRequest,
};

async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<GoalSummary>>> {
    let summaries = state.goal_service.get_goal_summaries(&user.user_id)?;
    Ok(Json(summaries))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(goal): Json<NewGoal>,
) -> ApiResult<Json<Goal>> {
    let g = state.goal_service.create_goal(&user.user_id, goal).await?;
    Ok(Json(g))
}

async fn get_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Goal>> {
    let g = state.goal_service.get_goal(&user.user_id, &id)?;
    Ok(Json(g))
}

async fn update_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(update): Json<GoalUpdate>,
) -> ApiResult<Json<Goal>> {
    let g = state
        .goal_service
        .update_goal(&user.user_id, &id, update)
        .await?;
    Ok(Json(g))
}

async fn delete_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<StatusCode> {
    state.goal_service.delete_goal(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_goal_plan(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<GoalPlan>> {
    let plan = state.goal_service.get_goal_plan(&user.user_id, &id)?;
    Ok(Json(plan))
}

async fn invite_member(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<InviteMemberRequest>,
) -> ApiResult<Json<Goal>> {
    let g = state
        .goal_service
        .invite_member(&user.user_id, &id, &body.email)
        .await?;
    Ok(Json(g))
}

async fn remove_member(
    Path((id, member_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Goal>> {
    let g = state
        .goal_service
        .remove_member(&user.user_id, &id, &member_id)
        .await?;
    Ok(Json(g))
}

async fn update_member_splits(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(splits): Json<Vec<MemberSplitUpdate>>,
) -> ApiResult<Json<Goal>> {
    let g = state
        .goal_service
        .update_member_splits(&user.user_id, &id, splits)
        .await?;
    Ok(Json(g))
}

async fn leave_goal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<StatusCode> {
    state.goal_service.leave_goal(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route(
            "/goals/{id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
        .route("/goals/{id}/plan", get(get_goal_plan))
        .route("/goals/{id}/members", post(invite_member))
        .route("/goals/{id}/members/splits", put(update_member_splits))
        .route("/goals/{id}/members/{user_id}", delete(remove_member))
        .route("/goals/{id}/leave", post(leave_goal))
}
