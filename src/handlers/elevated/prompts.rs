use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::database::models::PromptTemplate;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::schema::PromptTemplateInput;
use crate::services::{prompts, Caller};

/// GET /ai-prompts
pub async fn list(State(state): State<AppState>, Extension(caller): Extension<Caller>) -> ApiResult<Vec<PromptTemplate>> {
    Ok(ApiResponse::success(prompts::list(state.store.as_ref(), &caller).await?))
}

/// POST /ai-prompts - new templates start inactive
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<PromptTemplateInput>,
) -> ApiResult<PromptTemplate> {
    let prompt = prompts::create(state.store.as_ref(), &caller, input).await?;
    Ok(ApiResponse::created(prompt))
}

/// POST /ai-prompts/:id/activate
pub async fn activate(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<PromptTemplate> {
    let prompt = prompts::activate(state.store.as_ref(), &caller, parse_id(&id)?).await?;
    Ok(ApiResponse::success(prompt))
}
