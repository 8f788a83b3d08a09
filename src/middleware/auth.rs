use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;
use crate::services::{users, Caller};

/// Bearer authentication: verifies the token, signs the user in (provisioning on first
/// sign-in) and inserts the request's [`Caller`] into extensions.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Resolve the bearer token in `headers` to a caller.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Caller, ApiError> {
    let claims = verified_claims(state, headers)?;
    let user = users::sign_in(state.store.as_ref(), &claims).await?;
    tracing::debug!(user = %user.id, role = %user.role, "caller resolved");
    Ok(Caller::from(&user))
}

/// Read-only variant of [`authenticate`]: known users only, nothing is provisioned.
/// Any failure yields `None`.
pub async fn identify(state: &AppState, headers: &HeaderMap) -> Option<Caller> {
    let claims = verified_claims(state, headers).ok()?;
    match state.store.find_user(claims.sub).await {
        Ok(user) => user.as_ref().map(Caller::from),
        Err(e) => {
            tracing::warn!("Caller lookup failed: {}", e);
            None
        }
    }
}

fn verified_claims(state: &AppState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let token = extract_jwt_from_headers(headers).map_err(|msg| {
        tracing::warn!("Authentication failed: {}", msg);
        ApiError::unauthorized(msg)
    })?;

    validate_jwt(&token, &state.config.security).map_err(|e| {
        tracing::warn!("Authentication failed: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
