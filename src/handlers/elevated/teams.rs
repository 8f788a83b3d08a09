use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::{Learner, Team};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::schema::{LearnerTeamAssignmentInput, LearnerTeamRemovalInput, TeamInput};
use crate::services::{teams, users, Caller};

/// POST /admin/teams
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<TeamInput>,
) -> ApiResult<Team> {
    let team = teams::create(state.store.as_ref(), &caller, input).await?;
    Ok(ApiResponse::created(team))
}

/// POST /admin/assign-learner-team
pub async fn assign_learner(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<LearnerTeamAssignmentInput>,
) -> ApiResult<Learner> {
    let assignment = input
        .validate()
        .map_err(|errors| ApiError::validation_error("Validation failed", Some(errors)))?;
    let learner = users::assign_learner_team(state.store.as_ref(), &caller, assignment).await?;
    Ok(ApiResponse::success(learner))
}

/// POST /admin/remove-learner-team
pub async fn remove_learner(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<LearnerTeamRemovalInput>,
) -> ApiResult<Learner> {
    let user_id = input
        .validate()
        .map_err(|errors| ApiError::validation_error("Validation failed", Some(errors)))?;
    let learner = users::remove_learner_team(state.store.as_ref(), &caller, user_id).await?;
    Ok(ApiResponse::success(learner))
}
