use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::Team;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::teams::{self, TeamMember};
use crate::services::Caller;

/// GET /teams
pub async fn list(State(state): State<AppState>, Extension(caller): Extension<Caller>) -> ApiResult<Vec<Team>> {
    Ok(ApiResponse::success(teams::list(state.store.as_ref(), &caller).await?))
}

/// GET /teams/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Team> {
    Ok(ApiResponse::success(teams::get(state.store.as_ref(), &caller, parse_id(&id)?).await?))
}

/// GET /teams/:id/members
pub async fn members(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Vec<TeamMember>> {
    let members = teams::members(state.store.as_ref(), &caller, parse_id(&id)?).await?;
    Ok(ApiResponse::success(members))
}
