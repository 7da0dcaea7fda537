use std::sync::Arc;

use axum::{extract::State, routing::get, Extension, Json, Router};
use goalshare_core::users::User;

use crate::{
    auth::AuthenticatedUser, error::ApiResult, main_lib::AppState, models::UpdateProfileRequest,
};

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.user_service.get_user(&user.user_id)?))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    let updated = state
        .user_service
        .update_name(&user.user_id, body.name)
        .await?;
    Ok(Json(updated))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(get_me).put(update_me))
}
