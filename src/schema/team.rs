use serde::Deserialize;
use uuid::Uuid;

use super::{FieldErrors, Violations};
use crate::database::models::NewTeam;

pub const NAME_MAX: usize = 100;

/// Body of `POST /admin/teams`
#[derive(Debug, Default, Deserialize)]
pub struct TeamInput {
    pub name: Option<String>,
    pub active: Option<bool>,
}

impl TeamInput {
    pub fn validate(self) -> Result<NewTeam, FieldErrors> {
        let mut v = Violations::new();
        v.text("name", self.name, 1, NAME_MAX, true)
            .map(|name| NewTeam { name, active: self.active.unwrap_or(true) })
            .ok_or_else(|| v.into_errors())
    }
}

/// Body of `POST /admin/assign-learner-team`
#[derive(Debug, Default, Deserialize)]
pub struct LearnerTeamAssignmentInput {
    pub user_id: Option<String>,
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnerTeamAssignment {
    pub user_id: Uuid,
    pub team_id: Uuid,
}

impl LearnerTeamAssignmentInput {
    pub fn validate(self) -> Result<LearnerTeamAssignment, FieldErrors> {
        let mut v = Violations::new();
        let user_id = v.uuid("user_id", self.user_id.as_deref());
        let team_id = v.uuid("team_id", self.team_id.as_deref());
        match (user_id, team_id) {
            (Some(user_id), Some(team_id)) => Ok(LearnerTeamAssignment { user_id, team_id }),
            _ => Err(v.into_errors()),
        }
    }
}

/// Body of `POST /admin/remove-learner-team`
#[derive(Debug, Default, Deserialize)]
pub struct LearnerTeamRemovalInput {
    pub user_id: Option<String>,
}

impl LearnerTeamRemovalInput {
    pub fn validate(self) -> Result<Uuid, FieldErrors> {
        let mut v = Violations::new();
        v.uuid("user_id", self.user_id.as_deref()).ok_or_else(|| v.into_errors())
    }
}
