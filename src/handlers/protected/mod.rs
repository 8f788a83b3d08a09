// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Security Level: authenticated caller; role scoping happens in services
// Middleware: jwt_auth_middleware (Caller in extensions) + route_guard_middleware

pub mod coaching_logs;
pub mod profile;
pub mod prompts;
pub mod reflections;
pub mod teams;

pub use coaching_logs::{
    create as coaching_log_create, get as coaching_log_get, list as coaching_log_list,
    update_status as coaching_log_update_status, upcoming as coaching_log_upcoming,
};
pub use profile::{get as profile_get, update as profile_update};
pub use prompts::active as prompt_active;
pub use reflections::{
    ai_feedback as reflection_ai_feedback, create as reflection_create,
    feedback as reflection_feedback, get as reflection_get, list as reflection_list,
};
pub use teams::{get as team_get, list as team_list, members as team_members};
