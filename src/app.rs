use axum::{
    http::{header, HeaderValue, Method},
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::Store;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, route_guard_middleware};

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self { store, config: Arc::new(config) }
    }
}

pub fn app(state: AppState) -> Router {
    let authenticated = protected_routes()
        .merge(elevated_routes())
        // Layers run bottom-up: authenticate first, then guard the route prefix
        .route_layer(from_fn(route_guard_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(authenticated)
        // Global middleware
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes() -> Router<AppState> {
    use protected::*;

    Router::new()
        .route("/profile", get(profile_get))
        .route("/profile/update", patch(profile_update))
        .route("/reflections", get(reflection_list).post(reflection_create))
        .route("/reflections/:id", get(reflection_get))
        .route("/reflections/:id/feedback", post(reflection_feedback))
        .route("/reflections/:id/ai-feedback", put(reflection_ai_feedback))
        .route("/coaching-logs", get(coaching_log_list).post(coaching_log_create))
        .route("/coaching-logs/upcoming", get(coaching_log_upcoming))
        .route("/coaching-logs/:id", get(coaching_log_get))
        .route("/coaching-logs/:id/status", patch(coaching_log_update_status))
        .route("/teams", get(team_list))
        .route("/teams/:id", get(team_get))
        .route("/teams/:id/members", get(team_members))
        .route("/ai-prompts/active", get(prompt_active))
}

fn elevated_routes() -> Router<AppState> {
    use elevated::*;

    Router::new()
        .route("/admin/users", get(user_list))
        .route("/admin/users/:id/role", post(user_change_role))
        .route("/admin/users/:id/activate", post(user_activate))
        .route("/admin/users/:id/deactivate", post(user_deactivate))
        .route("/admin/teams", post(team_create))
        .route("/admin/assign-learner-team", post(team_assign_learner))
        .route("/admin/remove-learner-team", post(team_remove_learner))
        .route("/ai-prompts", get(prompt_list).post(prompt_create))
        .route("/ai-prompts/:id/activate", post(prompt_activate))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origin = if security.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = security
            .cors_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
