use serde_json::{json, Value};

use crate::middleware::ApiResponse;

/// GET / - service banner
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "Reflect API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Role-based learning backend: reflections, coaching logs, teams and AI prompts",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public, reports caller when a token is sent)",
            "profile": "/profile, /profile/update (authenticated)",
            "reflections": "/reflections[/:id[/feedback|/ai-feedback]] (authenticated, role scoped)",
            "coaching_logs": "/coaching-logs[/upcoming|/:id[/status]] (coach, admin)",
            "teams": "/teams[/:id[/members]] (coach, admin)",
            "ai_prompts": "/ai-prompts[/active|/:id/activate] (admin; active: coach, admin)",
            "admin": "/admin/* (admin)",
        }
    }))
}
