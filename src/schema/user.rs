use serde::Deserialize;

use super::{FieldErrors, Violations};
use crate::policy::Role;

pub const NAME_MAX: usize = 100;

/// Body of `PATCH /profile/update`
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateInput {
    pub name: Option<String>,
}

impl ProfileUpdateInput {
    pub fn validate(self) -> Result<String, FieldErrors> {
        let mut v = Violations::new();
        v.text("name", self.name, 1, NAME_MAX, true).ok_or_else(|| v.into_errors())
    }
}

/// Body of `POST /admin/users/:id/role`
#[derive(Debug, Default, Deserialize)]
pub struct RoleChangeInput {
    pub role: Option<String>,
}

impl RoleChangeInput {
    pub fn validate(self) -> Result<Role, FieldErrors> {
        let allowed: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
        let mut v = Violations::new();
        v.one_of::<Role>("role", self.role.as_deref(), &allowed)
            .ok_or_else(|| v.into_errors())
    }
}
