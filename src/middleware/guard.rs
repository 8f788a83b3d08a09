use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::policy::{can_access_route, required_role_for};
use crate::services::Caller;

/// Route-prefix guard. Runs after [`super::jwt_auth_middleware`] and asks the role
/// policy whether the caller may reach the requested path.
pub async fn route_guard_middleware(request: Request, next: Next) -> Response {
    let Some(caller) = request.extensions().get::<Caller>() else {
        return ApiError::unauthorized("Authentication required").into_response();
    };

    let path = request.uri().path();
    if !can_access_route(caller.role, path) {
        let required = required_role_for(path).map(|r| r.as_str()).unwrap_or("unknown");
        tracing::warn!(user = %caller.id, role = %caller.role, path, "route denied");
        return ApiError::forbidden(format!("Requires {} role", required)).into_response();
    }

    next.run(request).await
}
