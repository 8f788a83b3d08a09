use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::CoachingLog;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::schema::{CoachingLogInput, CoachingLogStatusInput};
use crate::services::{coaching_logs, Caller};

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub days_ahead: Option<String>,
}

/// GET /coaching-logs
pub async fn list(State(state): State<AppState>, Extension(caller): Extension<Caller>) -> ApiResult<Vec<CoachingLog>> {
    let logs = coaching_logs::list(state.store.as_ref(), &caller).await?;
    Ok(ApiResponse::success(logs))
}

/// POST /coaching-logs
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    JsonBody(input): JsonBody<CoachingLogInput>,
) -> ApiResult<CoachingLog> {
    let log = coaching_logs::create(state.store.as_ref(), &caller, input).await?;
    Ok(ApiResponse::created(log))
}

/// GET /coaching-logs/upcoming?days_ahead=N
pub async fn upcoming(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<UpcomingQuery>,
) -> ApiResult<Vec<CoachingLog>> {
    let days_ahead = match query.days_ahead.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
            let mut errors = std::collections::HashMap::new();
            errors.insert("days_ahead".to_string(), format!("Invalid number: {}", raw));
            ApiError::validation_error("Invalid query parameters", Some(errors))
        })?),
        None => None,
    };

    let logs = coaching_logs::upcoming(state.store.as_ref(), &caller, days_ahead, &state.config.coaching).await?;
    Ok(ApiResponse::success(logs))
}

/// GET /coaching-logs/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<CoachingLog> {
    let log = coaching_logs::get(state.store.as_ref(), &caller, parse_id(&id)?).await?;
    Ok(ApiResponse::success(log))
}

/// PATCH /coaching-logs/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<CoachingLogStatusInput>,
) -> ApiResult<CoachingLog> {
    let log = coaching_logs::update_status(state.store.as_ref(), &caller, parse_id(&id)?, input).await?;
    Ok(ApiResponse::success(log))
}
