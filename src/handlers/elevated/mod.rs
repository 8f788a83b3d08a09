// handlers/elevated/mod.rs - Elevated handlers (admin)
//
// Security Level: admin. Routes under /admin are refused by the route guard before
// reaching a handler; /ai-prompts management relies on the service-level role check.

pub mod prompts;
pub mod teams;
pub mod users;

pub use prompts::{activate as prompt_activate, create as prompt_create, list as prompt_list};
pub use teams::{assign_learner as team_assign_learner, create as team_create, remove_learner as team_remove_learner};
pub use users::{
    activate as user_activate, change_role as user_change_role, deactivate as user_deactivate, list as user_list,
};
