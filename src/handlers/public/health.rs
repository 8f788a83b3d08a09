use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::app::AppState;
use crate::middleware::identify;

/// GET /health - store status plus the caller, when a valid bearer token names a known
/// user. Invalid tokens and unknown subjects are reported as unauthenticated; nothing is
/// provisioned here.
pub async fn health(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let now = chrono::Utc::now();

    let caller = if headers.contains_key(AUTHORIZATION) {
        identify(&state, &headers).await
    } else {
        None
    };

    let (status, store) = match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let body = json!({
        "success": status == StatusCode::OK,
        "data": {
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "timestamp": now,
            "store": store,
            "authenticated": caller.is_some(),
            "user": caller,
        }
    });

    (status, Json(body)).into_response()
}
