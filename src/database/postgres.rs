use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::models::{
    Coach, CoachingLog, Learner, LogStatus, NewCoachingLog, NewPromptTemplate, NewReflection,
    NewTeam, NewUser, PromptTemplate, Reflection, Team, User,
};
use crate::database::store::{Store, StoreError, StoreResult};
use crate::policy::Role;

const USER_COLUMNS: &str = "id, name, email, role, avatar_url, created_at, updated_at";
const LEARNER_COLUMNS: &str = "id, user_id, team_id, active, created_at, updated_at";
const COACH_COLUMNS: &str = "id, user_id, active, created_at, updated_at";
const TEAM_COLUMNS: &str = "id, name, active, created_at, updated_at";
const REFLECTION_COLUMNS: &str = "id, learner_id, title, content, week_start, created_at, \
    coach_feedback, coach_feedback_by, coach_feedback_at, ai_feedback, ai_prompt_version, ai_feedback_at";
const LOG_COLUMNS: &str = "id, coach_id, learner_id, team_id, session_date, session_type, notes, \
    next_actions, follow_up_date, status, created_at, updated_at";
const PROMPT_COLUMNS: &str = "id, name, purpose, content, version, active, created_at, updated_at";

// Enum-valued columns are TEXT with CHECK constraints; rows convert through FromStr.

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<Role>().map_err(StoreError::DataCorruption)?;
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CoachingLogRow {
    id: Uuid,
    coach_id: Uuid,
    learner_id: Option<Uuid>,
    team_id: Option<Uuid>,
    session_date: NaiveDate,
    session_type: String,
    notes: String,
    next_actions: Option<String>,
    follow_up_date: Option<NaiveDate>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CoachingLogRow> for CoachingLog {
    type Error = StoreError;

    fn try_from(row: CoachingLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            coach_id: row.coach_id,
            learner_id: row.learner_id,
            team_id: row.team_id,
            session_date: row.session_date,
            session_type: row.session_type.parse().map_err(StoreError::DataCorruption)?,
            notes: row.notes,
            next_actions: row.next_actions,
            follow_up_date: row.follow_up_date,
            status: row.status.parse().map_err(StoreError::DataCorruption)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Map constraint violations to `Conflict`; everything else stays a driver error.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        // 23505 unique_violation, 23P01 exclusion_violation, 23503 foreign_key_violation
        if matches!(db.code().as_deref(), Some("23505") | Some("23P01") | Some("23503")) {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    StoreError::Sqlx(err)
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.fetch_user(id).await
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        let rows = sqlx::query_as::<_, UserRow>(&sql).fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    async fn provision_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<(Uuid,)> = sqlx::query_as(
            "INSERT INTO users (id, name, email, role, avatar_url) VALUES ($1, $2, $3, 'learner', $4) \
             ON CONFLICT (id) DO NOTHING RETURNING id",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.avatar_url)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_write_error)?;

        if inserted.is_some() {
            sqlx::query("INSERT INTO learners (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING")
                .bind(Uuid::new_v4())
                .bind(user.id)
                .execute(&mut *tx)
                .await
                .map_err(map_write_error)?;
        }

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        User::try_from(row)
    }

    async fn update_user_name(&self, id: Uuid, name: &str) -> StoreResult<Option<User>> {
        let sql = format!("UPDATE users SET name = $2, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("UPDATE users SET role = $2, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        // The record matching the new role is upserted active, the others are retired.
        for (table, extension_role) in [("learners", Role::Learner), ("coaches", Role::Coach)] {
            if extension_role == role {
                let sql = format!(
                    "INSERT INTO {table} (id, user_id) VALUES ($1, $2) \
                     ON CONFLICT (user_id) DO UPDATE SET active = true, updated_at = now()"
                );
                sqlx::query(&sql)
                    .bind(Uuid::new_v4())
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_write_error)?;
            } else {
                let sql = format!("UPDATE {table} SET active = false, updated_at = now() WHERE user_id = $1 AND active");
                sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
            }
        }

        tx.commit().await?;
        User::try_from(row).map(Some)
    }

    async fn find_learner(&self, id: Uuid) -> StoreResult<Option<Learner>> {
        let sql = format!("SELECT {LEARNER_COLUMNS} FROM learners WHERE id = $1");
        Ok(sqlx::query_as::<_, Learner>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_learner_by_user(&self, user_id: Uuid) -> StoreResult<Option<Learner>> {
        let sql = format!("SELECT {LEARNER_COLUMNS} FROM learners WHERE user_id = $1");
        Ok(sqlx::query_as::<_, Learner>(&sql).bind(user_id).fetch_optional(&self.pool).await?)
    }

    async fn set_learner_team(&self, user_id: Uuid, team_id: Option<Uuid>) -> StoreResult<Option<Learner>> {
        let sql = format!(
            "UPDATE learners SET team_id = $2, updated_at = now() WHERE user_id = $1 RETURNING {LEARNER_COLUMNS}"
        );
        sqlx::query_as::<_, Learner>(&sql)
            .bind(user_id)
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn list_team_learners(&self, team_id: Uuid) -> StoreResult<Vec<Learner>> {
        let sql = format!("SELECT {LEARNER_COLUMNS} FROM learners WHERE team_id = $1 ORDER BY created_at");
        Ok(sqlx::query_as::<_, Learner>(&sql).bind(team_id).fetch_all(&self.pool).await?)
    }

    async fn find_coach_by_user(&self, user_id: Uuid) -> StoreResult<Option<Coach>> {
        let sql = format!("SELECT {COACH_COLUMNS} FROM coaches WHERE user_id = $1");
        Ok(sqlx::query_as::<_, Coach>(&sql).bind(user_id).fetch_optional(&self.pool).await?)
    }

    async fn set_learner_active(&self, user_id: Uuid, active: bool) -> StoreResult<Option<Learner>> {
        let sql = format!(
            "UPDATE learners SET active = $2, updated_at = now() WHERE user_id = $1 RETURNING {LEARNER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Learner>(&sql)
            .bind(user_id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn set_coach_active(&self, user_id: Uuid, active: bool) -> StoreResult<Option<Coach>> {
        let sql = format!(
            "UPDATE coaches SET active = $2, updated_at = now() WHERE user_id = $1 RETURNING {COACH_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Coach>(&sql)
            .bind(user_id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_teams(&self) -> StoreResult<Vec<Team>> {
        let sql = format!("SELECT {TEAM_COLUMNS} FROM teams ORDER BY name");
        Ok(sqlx::query_as::<_, Team>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>> {
        let sql = format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1");
        Ok(sqlx::query_as::<_, Team>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_team(&self, team: NewTeam) -> StoreResult<Team> {
        let sql = format!("INSERT INTO teams (id, name, active) VALUES ($1, $2, $3) RETURNING {TEAM_COLUMNS}");
        sqlx::query_as::<_, Team>(&sql)
            .bind(Uuid::new_v4())
            .bind(&team.name)
            .bind(team.active)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn insert_reflection(&self, reflection: NewReflection) -> StoreResult<Reflection> {
        let sql = format!(
            "INSERT INTO reflections (id, learner_id, title, content, week_start) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {REFLECTION_COLUMNS}"
        );
        sqlx::query_as::<_, Reflection>(&sql)
            .bind(Uuid::new_v4())
            .bind(reflection.learner_id)
            .bind(&reflection.title)
            .bind(&reflection.content)
            .bind(reflection.week_start)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn find_reflection(&self, id: Uuid) -> StoreResult<Option<Reflection>> {
        let sql = format!("SELECT {REFLECTION_COLUMNS} FROM reflections WHERE id = $1");
        Ok(sqlx::query_as::<_, Reflection>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list_reflections(&self, learner_id: Option<Uuid>) -> StoreResult<Vec<Reflection>> {
        let sql = format!(
            "SELECT {REFLECTION_COLUMNS} FROM reflections \
             WHERE ($1::uuid IS NULL OR learner_id = $1) ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Reflection>(&sql).bind(learner_id).fetch_all(&self.pool).await?)
    }

    async fn set_coach_feedback(&self, id: Uuid, feedback: &str, coach_user_id: Uuid) -> StoreResult<Option<Reflection>> {
        let sql = format!(
            "UPDATE reflections SET coach_feedback = $2, coach_feedback_by = $3, coach_feedback_at = now() \
             WHERE id = $1 RETURNING {REFLECTION_COLUMNS}"
        );
        sqlx::query_as::<_, Reflection>(&sql)
            .bind(id)
            .bind(feedback)
            .bind(coach_user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn set_ai_feedback(&self, id: Uuid, feedback: &str, prompt_version: Option<i32>) -> StoreResult<Option<Reflection>> {
        let sql = format!(
            "UPDATE reflections SET ai_feedback = $2, ai_prompt_version = $3, ai_feedback_at = now() \
             WHERE id = $1 RETURNING {REFLECTION_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Reflection>(&sql)
            .bind(id)
            .bind(feedback)
            .bind(prompt_version)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_coaching_log(&self, log: NewCoachingLog) -> StoreResult<CoachingLog> {
        let sql = format!(
            "INSERT INTO coaching_logs \
             (id, coach_id, learner_id, team_id, session_date, session_type, notes, next_actions, follow_up_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {LOG_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CoachingLogRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(log.coach_id)
            .bind(log.learner_id)
            .bind(log.team_id)
            .bind(log.session_date)
            .bind(log.session_type.as_str())
            .bind(&log.notes)
            .bind(&log.next_actions)
            .bind(log.follow_up_date)
            .bind(log.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        CoachingLog::try_from(row)
    }

    async fn find_coaching_log(&self, id: Uuid) -> StoreResult<Option<CoachingLog>> {
        let sql = format!("SELECT {LOG_COLUMNS} FROM coaching_logs WHERE id = $1");
        let row = sqlx::query_as::<_, CoachingLogRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(CoachingLog::try_from).transpose()
    }

    async fn list_coaching_logs(&self, coach_id: Option<Uuid>) -> StoreResult<Vec<CoachingLog>> {
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM coaching_logs \
             WHERE ($1::uuid IS NULL OR coach_id = $1) ORDER BY session_date DESC, created_at DESC"
        );
        let rows = sqlx::query_as::<_, CoachingLogRow>(&sql)
            .bind(coach_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn upcoming_follow_ups(&self, coach_id: Option<Uuid>, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<CoachingLog>> {
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM coaching_logs \
             WHERE status = 'open' AND follow_up_date BETWEEN $2 AND $3 \
             AND ($1::uuid IS NULL OR coach_id = $1) \
             ORDER BY follow_up_date ASC, created_at ASC"
        );
        let rows = sqlx::query_as::<_, CoachingLogRow>(&sql)
            .bind(coach_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn set_coaching_log_status(&self, id: Uuid, status: LogStatus) -> StoreResult<Option<CoachingLog>> {
        let sql = format!(
            "UPDATE coaching_logs SET status = $2, updated_at = now() WHERE id = $1 RETURNING {LOG_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CoachingLogRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(CoachingLog::try_from).transpose()
    }

    async fn list_prompts(&self) -> StoreResult<Vec<PromptTemplate>> {
        let sql = format!("SELECT {PROMPT_COLUMNS} FROM prompt_templates ORDER BY purpose, version DESC");
        Ok(sqlx::query_as::<_, PromptTemplate>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_prompt(&self, id: Uuid) -> StoreResult<Option<PromptTemplate>> {
        let sql = format!("SELECT {PROMPT_COLUMNS} FROM prompt_templates WHERE id = $1");
        Ok(sqlx::query_as::<_, PromptTemplate>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_prompt(&self, prompt: NewPromptTemplate) -> StoreResult<PromptTemplate> {
        let sql = format!(
            "INSERT INTO prompt_templates (id, name, purpose, content, version, active) \
             VALUES ($1, $2, $3, $4, $5, false) RETURNING {PROMPT_COLUMNS}"
        );
        sqlx::query_as::<_, PromptTemplate>(&sql)
            .bind(Uuid::new_v4())
            .bind(&prompt.name)
            .bind(&prompt.purpose)
            .bind(&prompt.content)
            .bind(prompt.version)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn active_prompt(&self, purpose: &str) -> StoreResult<Option<PromptTemplate>> {
        let sql = format!("SELECT {PROMPT_COLUMNS} FROM prompt_templates WHERE purpose = $1 AND active");
        Ok(sqlx::query_as::<_, PromptTemplate>(&sql)
            .bind(purpose)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn activate_prompt(&self, id: Uuid) -> StoreResult<Option<PromptTemplate>> {
        // One statement: the target and all its siblings flip together.
        let sql = format!(
            "UPDATE prompt_templates SET active = (id = $1), updated_at = now() \
             WHERE purpose = (SELECT purpose FROM prompt_templates WHERE id = $1) \
             RETURNING {PROMPT_COLUMNS}"
        );
        let rows = sqlx::query_as::<_, PromptTemplate>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(rows.into_iter().find(|p| p.id == id))
    }
}
