use serde::Serialize;
use uuid::Uuid;

use super::{Caller, ServiceError, ServiceResult};
use crate::database::models::Team;
use crate::database::Store;
use crate::policy::Role;
use crate::schema::TeamInput;

/// A learner on a team, joined with their user record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMember {
    pub learner_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub active: bool,
}

fn not_found() -> ServiceError {
    ServiceError::NotFound("Team not found".to_string())
}

pub async fn list(store: &dyn Store, caller: &Caller) -> ServiceResult<Vec<Team>> {
    caller.require(Role::Coach)?;
    Ok(store.list_teams().await?)
}

pub async fn get(store: &dyn Store, caller: &Caller, id: Uuid) -> ServiceResult<Team> {
    caller.require(Role::Coach)?;
    store.find_team(id).await?.ok_or_else(not_found)
}

pub async fn create(store: &dyn Store, caller: &Caller, input: TeamInput) -> ServiceResult<Team> {
    caller.require(Role::Admin)?;
    let team = store.insert_team(input.validate()?).await?;
    tracing::info!(team = %team.id, name = %team.name, "team created");
    Ok(team)
}

pub async fn members(store: &dyn Store, caller: &Caller, id: Uuid) -> ServiceResult<Vec<TeamMember>> {
    let team = get(store, caller, id).await?;

    let mut members = Vec::new();
    for learner in store.list_team_learners(team.id).await? {
        let Some(user) = store.find_user(learner.user_id).await? else {
            tracing::warn!(learner = %learner.id, "learner without user record");
            continue;
        };
        members.push(TeamMember {
            learner_id: learner.id,
            user_id: user.id,
            name: user.name,
            email: user.email,
            active: learner.active,
        });
    }
    Ok(members)
}
