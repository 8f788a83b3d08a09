use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{LearnerReflection, Reflection, ReflectionView};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::schema::{AiFeedbackInput, CoachFeedbackInput, ReflectionInput, Violations};
use crate::services::{reflections, Caller};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub learner_id: Option<String>,
}

/// GET /reflections[?learner_id=] - own reflections for learners, all for coaches and admins
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<ReflectionView>> {
    let mut v = Violations::new();
    let learner_id = v.optional_uuid("learner_id", query.learner_id.as_deref());
    if !v.is_empty() {
        return Err(ApiError::validation_error("Invalid query parameters", Some(v.into_errors())));
    }

    let views = reflections::list(state.store.as_ref(), &caller, learner_id).await?;
    Ok(ApiResponse::success(views))
}

/// POST /reflections
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<ReflectionInput>,
) -> ApiResult<LearnerReflection> {
    let reflection = reflections::create(state.store.as_ref(), &caller, input).await?;
    Ok(ApiResponse::created(reflection))
}

/// GET /reflections/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<ReflectionView> {
    let view = reflections::get(state.store.as_ref(), &caller, parse_id(&id)?).await?;
    Ok(ApiResponse::success(view))
}

/// POST /reflections/:id/feedback
pub async fn feedback(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<CoachFeedbackInput>,
) -> ApiResult<Reflection> {
    let reflection = reflections::attach_feedback(state.store.as_ref(), &caller, parse_id(&id)?, input).await?;
    Ok(ApiResponse::success(reflection))
}

/// PUT /reflections/:id/ai-feedback - result callback from the AI feedback job
pub async fn ai_feedback(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<AiFeedbackInput>,
) -> ApiResult<Reflection> {
    let reflection = reflections::attach_ai_feedback(state.store.as_ref(), &caller, parse_id(&id)?, input).await?;
    Ok(ApiResponse::success(reflection))
}
