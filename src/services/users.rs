use serde::Serialize;
use uuid::Uuid;

use super::{field_error, Caller, ServiceError, ServiceResult};
use crate::auth::Claims;
use crate::database::models::{Coach, Learner, NewUser, User};
use crate::database::Store;
use crate::policy::Role;
use crate::schema::{LearnerTeamAssignment, ProfileUpdateInput, RoleChangeInput};

fn user_not_found() -> ServiceError {
    ServiceError::NotFound("User not found".to_string())
}

fn learner_not_found() -> ServiceError {
    ServiceError::NotFound("Learner not found".to_string())
}

/// A user with their learner and coach records.
#[derive(Debug, Clone, Serialize)]
pub struct Membership {
    pub user: User,
    pub learner: Option<Learner>,
    pub coach: Option<Coach>,
}

/// Resolve the token subject to a user, provisioning first-time subjects as learners.
///
/// A first sign-in needs an `email` claim; the display name falls back to the part of
/// the address before `@`.
pub async fn sign_in(store: &dyn Store, claims: &Claims) -> ServiceResult<User> {
    if let Some(user) = store.find_user(claims.sub).await? {
        return Ok(user);
    }

    let email = claims
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            tracing::warn!(sub = %claims.sub, "first sign-in without an email claim");
            ServiceError::Unauthenticated
        })?;
    let name = claims
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email));

    let user = store
        .provision_user(NewUser { id: claims.sub, name: name.to_string(), email: email.to_string(), avatar_url: None })
        .await?;
    tracing::info!(user = %user.id, "provisioned user on first sign-in");
    Ok(user)
}

pub async fn profile(store: &dyn Store, caller: &Caller) -> ServiceResult<User> {
    store.find_user(caller.id).await?.ok_or_else(user_not_found)
}

/// Self-service: callers may only rename themselves.
pub async fn update_profile(store: &dyn Store, caller: &Caller, input: ProfileUpdateInput) -> ServiceResult<User> {
    let name = input.validate()?;
    store.update_user_name(caller.id, &name).await?.ok_or_else(user_not_found)
}

pub async fn list(store: &dyn Store, caller: &Caller) -> ServiceResult<Vec<User>> {
    caller.require(Role::Admin)?;
    Ok(store.list_users().await?)
}

pub async fn change_role(store: &dyn Store, caller: &Caller, user_id: Uuid, input: RoleChangeInput) -> ServiceResult<User> {
    caller.require(Role::Admin)?;
    let role = input.validate()?;

    let user = store.set_user_role(user_id, role).await?.ok_or_else(user_not_found)?;
    tracing::info!(user = %user_id, role = %role, by = %caller.id, "role changed");
    Ok(user)
}

/// Activate or deactivate the learner/coach record that goes with the user's role.
/// Admins have no such record.
pub async fn set_active(store: &dyn Store, caller: &Caller, user_id: Uuid, active: bool) -> ServiceResult<Membership> {
    caller.require(Role::Admin)?;
    let user = store.find_user(user_id).await?.ok_or_else(user_not_found)?;

    match user.role {
        Role::Learner => {
            store.set_learner_active(user_id, active).await?.ok_or_else(learner_not_found)?;
        }
        Role::Coach => {
            store
                .set_coach_active(user_id, active)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Coach not found".to_string()))?;
        }
        Role::Admin => {
            return Err(ServiceError::Conflict("Admins have no learner or coach record".to_string()));
        }
    }
    tracing::info!(user = %user_id, role = %user.role, active, by = %caller.id, "membership updated");

    Ok(Membership {
        learner: store.find_learner_by_user(user_id).await?,
        coach: store.find_coach_by_user(user_id).await?,
        user,
    })
}

/// Put a learner on an active team, replacing any previous team.
pub async fn assign_learner_team(store: &dyn Store, caller: &Caller, assignment: LearnerTeamAssignment) -> ServiceResult<Learner> {
    caller.require(Role::Admin)?;
    let LearnerTeamAssignment { user_id, team_id } = assignment;

    if store.find_learner_by_user(user_id).await?.is_none() {
        return Err(learner_not_found());
    }
    match store.find_team(team_id).await? {
        Some(team) if team.active => {}
        Some(_) => return Err(field_error("team_id", "Team is inactive")),
        None => return Err(field_error("team_id", "Team not found")),
    }

    let learner = store
        .set_learner_team(user_id, Some(team_id))
        .await?
        .ok_or_else(learner_not_found)?;
    tracing::info!(user = %user_id, team = %team_id, "learner assigned to team");
    Ok(learner)
}

pub async fn remove_learner_team(store: &dyn Store, caller: &Caller, user_id: Uuid) -> ServiceResult<Learner> {
    caller.require(Role::Admin)?;
    let learner = store.set_learner_team(user_id, None).await?.ok_or_else(learner_not_found)?;
    tracing::info!(user = %user_id, "learner removed from team");
    Ok(learner)
}
