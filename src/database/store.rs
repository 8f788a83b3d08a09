use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    Coach, CoachingLog, Learner, LogStatus, NewCoachingLog, NewPromptTemplate, NewReflection,
    NewTeam, NewUser, PromptTemplate, Reflection, Team, User,
};
use crate::policy::Role;

/// Errors from the backend store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt row: {0}")]
    DataCorruption(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend relational store.
///
/// Every mutation is a single logical operation: implementations must not expose an
/// intermediate state (e.g. zero active prompt templates during an activation).
/// Lookups return `Ok(None)` for absent rows; callers decide whether that is a 404.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> StoreResult<()>;

    // Users
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    /// Insert a first-time user as a learner with an active learner record.
    /// Returns the existing user untouched when `user.id` is already known.
    async fn provision_user(&self, user: NewUser) -> StoreResult<User>;
    async fn update_user_name(&self, id: Uuid, name: &str) -> StoreResult<Option<User>>;
    /// Change the role. The learner/coach record matching the new role is created or
    /// reactivated; the records of the other roles are deactivated.
    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>>;

    // Learners and coaches
    async fn find_learner(&self, id: Uuid) -> StoreResult<Option<Learner>>;
    async fn find_learner_by_user(&self, user_id: Uuid) -> StoreResult<Option<Learner>>;
    async fn set_learner_team(&self, user_id: Uuid, team_id: Option<Uuid>) -> StoreResult<Option<Learner>>;
    async fn list_team_learners(&self, team_id: Uuid) -> StoreResult<Vec<Learner>>;
    async fn find_coach_by_user(&self, user_id: Uuid) -> StoreResult<Option<Coach>>;
    /// `None` when the user has no learner record.
    async fn set_learner_active(&self, user_id: Uuid, active: bool) -> StoreResult<Option<Learner>>;
    async fn set_coach_active(&self, user_id: Uuid, active: bool) -> StoreResult<Option<Coach>>;

    // Teams
    async fn list_teams(&self) -> StoreResult<Vec<Team>>;
    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>>;
    async fn insert_team(&self, team: NewTeam) -> StoreResult<Team>;

    // Reflections (newest first)
    async fn insert_reflection(&self, reflection: NewReflection) -> StoreResult<Reflection>;
    async fn find_reflection(&self, id: Uuid) -> StoreResult<Option<Reflection>>;
    async fn list_reflections(&self, learner_id: Option<Uuid>) -> StoreResult<Vec<Reflection>>;
    async fn set_coach_feedback(&self, id: Uuid, feedback: &str, coach_user_id: Uuid) -> StoreResult<Option<Reflection>>;
    async fn set_ai_feedback(&self, id: Uuid, feedback: &str, prompt_version: Option<i32>) -> StoreResult<Option<Reflection>>;

    // Coaching logs
    async fn insert_coaching_log(&self, log: NewCoachingLog) -> StoreResult<CoachingLog>;
    async fn find_coaching_log(&self, id: Uuid) -> StoreResult<Option<CoachingLog>>;
    /// Logs by `session_date` desc, limited to one author when `coach_id` is set.
    async fn list_coaching_logs(&self, coach_id: Option<Uuid>) -> StoreResult<Vec<CoachingLog>>;
    /// Open logs with `from <= follow_up_date <= to`, soonest first.
    async fn upcoming_follow_ups(&self, coach_id: Option<Uuid>, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<CoachingLog>>;
    async fn set_coaching_log_status(&self, id: Uuid, status: LogStatus) -> StoreResult<Option<CoachingLog>>;

    // Prompt templates
    async fn list_prompts(&self) -> StoreResult<Vec<PromptTemplate>>;
    async fn find_prompt(&self, id: Uuid) -> StoreResult<Option<PromptTemplate>>;
    async fn insert_prompt(&self, prompt: NewPromptTemplate) -> StoreResult<PromptTemplate>;
    async fn active_prompt(&self, purpose: &str) -> StoreResult<Option<PromptTemplate>>;
    /// Activate `id` and deactivate every sibling with the same purpose, atomically.
    async fn activate_prompt(&self, id: Uuid) -> StoreResult<Option<PromptTemplate>>;
}
