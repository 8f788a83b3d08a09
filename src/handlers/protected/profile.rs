use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::schema::ProfileUpdateInput;
use crate::services::{users, Caller};

/// GET /profile
pub async fn get(State(state): State<AppState>, Extension(caller): Extension<Caller>) -> ApiResult<User> {
    let user = users::profile(state.store.as_ref(), &caller).await?;
    Ok(ApiResponse::success(user))
}

/// PATCH /profile/update
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<ProfileUpdateInput>,
) -> ApiResult<User> {
    let user = users::update_profile(state.store.as_ref(), &caller, input).await?;
    Ok(ApiResponse::success(user))
}
