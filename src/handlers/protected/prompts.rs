use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::PromptTemplate;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{prompts, Caller};

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub purpose: Option<String>,
}

/// GET /ai-prompts/active?purpose= - defaults to reflection_feedback
pub async fn active(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ActiveQuery>,
) -> ApiResult<PromptTemplate> {
    let prompt = prompts::active(state.store.as_ref(), &caller, query.purpose.as_deref()).await?;
    Ok(ApiResponse::success(prompt))
}
