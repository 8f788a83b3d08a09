//! Role policy: the single authority for role checks.
//!
//! Roles form a hierarchy `admin ⊇ coach ⊇ learner`. Handlers and services never
//! compare role names themselves; they ask [`has_role`] or [`can_access_route`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Learner,
    Coach,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Learner, Role::Coach, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Learner => "learner",
            Role::Coach => "coach",
            Role::Admin => "admin",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Role::Learner => 0,
            Role::Coach => 1,
            Role::Admin => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learner" => Ok(Role::Learner),
            "coach" => Ok(Role::Coach),
            "admin" => Ok(Role::Admin),
            other => Err(format!("invalid role: {}", other)),
        }
    }
}

/// Does a user holding `role` satisfy a check for `required`?
pub fn has_role(role: Role, required: Role) -> bool {
    role.rank() >= required.rank()
}

/// Route prefixes that need more than an authenticated caller.
const GUARDED_PREFIXES: &[(&str, Role)] = &[("/admin", Role::Admin), ("/coach", Role::Coach)];

/// Can a user holding `role` reach `path`? Paths outside the guarded prefixes are allowed.
pub fn can_access_route(role: Role, path: &str) -> bool {
    match required_role_for(path) {
        Some(required) => has_role(role, required),
        None => true,
    }
}

/// Role required by the guarded prefix covering `path`, if any.
pub fn required_role_for(path: &str) -> Option<Role> {
    GUARDED_PREFIXES
        .iter()
        .find(|(prefix, _)| is_under(path, prefix))
        .map(|(_, role)| *role)
}

// "/admin" covers "/admin" and "/admin/..." but not "/administrator".
fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
