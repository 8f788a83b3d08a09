use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::User;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::schema::RoleChangeInput;
use crate::services::{users, users::Membership, Caller};

/// GET /admin/users
pub async fn list(State(state): State<AppState>, Extension(caller): Extension<Caller>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(users::list(state.store.as_ref(), &caller).await?))
}

/// POST /admin/users/:id/role
pub async fn change_role(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<RoleChangeInput>,
) -> ApiResult<User> {
    let user = users::change_role(state.store.as_ref(), &caller, parse_id(&id)?, input).await?;
    Ok(ApiResponse::success(user))
}

/// POST /admin/users/:id/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Membership> {
    let membership = users::set_active(state.store.as_ref(), &caller, parse_id(&id)?, false).await?;
    Ok(ApiResponse::success(membership))
}

/// POST /admin/users/:id/activate
pub async fn activate(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Membership> {
    let membership = users::set_active(state.store.as_ref(), &caller, parse_id(&id)?, true).await?;
    Ok(ApiResponse::success(membership))
}
