use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{
    Coach, CoachingLog, Learner, LogStatus, NewCoachingLog, NewPromptTemplate, NewReflection,
    NewTeam, NewUser, PromptTemplate, Reflection, Team, User,
};
use crate::database::store::{Store, StoreResult};
use crate::policy::Role;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    learners: HashMap<Uuid, Learner>,
    coaches: HashMap<Uuid, Coach>,
    teams: HashMap<Uuid, Team>,
    reflections: HashMap<Uuid, Reflection>,
    coaching_logs: HashMap<Uuid, CoachingLog>,
    prompts: HashMap<Uuid, PromptTemplate>,
}

impl Tables {
    fn learner_by_user_mut(&mut self, user_id: Uuid) -> Option<&mut Learner> {
        self.learners.values_mut().find(|l| l.user_id == user_id)
    }

    fn coach_by_user_mut(&mut self, user_id: Uuid) -> Option<&mut Coach> {
        self.coaches.values_mut().find(|c| c.user_id == user_id)
    }

    fn ensure_learner(&mut self, user_id: Uuid) {
        let now = Utc::now();
        if let Some(learner) = self.learner_by_user_mut(user_id) {
            learner.active = true;
            learner.updated_at = now;
            return;
        }
        let id = Uuid::new_v4();
        self.learners.insert(
            id,
            Learner { id, user_id, team_id: None, active: true, created_at: now, updated_at: now },
        );
    }

    fn set_learner_active(&mut self, user_id: Uuid, active: bool) -> Option<Learner> {
        self.learner_by_user_mut(user_id).map(|learner| {
            learner.active = active;
            learner.updated_at = Utc::now();
            learner.clone()
        })
    }

    fn set_coach_active(&mut self, user_id: Uuid, active: bool) -> Option<Coach> {
        self.coach_by_user_mut(user_id).map(|coach| {
            coach.active = active;
            coach.updated_at = Utc::now();
            coach.clone()
        })
    }

    fn ensure_coach(&mut self, user_id: Uuid) {
        let now = Utc::now();
        if let Some(coach) = self.coach_by_user_mut(user_id) {
            coach.active = true;
            coach.updated_at = now;
            return;
        }
        let id = Uuid::new_v4();
        self.coaches.insert(id, Coach { id, user_id, active: true, created_at: now, updated_at: now });
    }
}

/// In-process store. Each operation holds one lock for its whole duration, which gives
/// the same single-step semantics the PostgreSQL statements provide.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.tables.read().await.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn provision_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.users.get(&user.id) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let created = User {
            id: user.id,
            name: user.name,
            email: user.email,
            role: Role::Learner,
            avatar_url: user.avatar_url,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        tables.ensure_learner(created.id);
        Ok(created)
    }

    async fn update_user_name(&self, id: Uuid, name: &str) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.name = name.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        user.role = role;
        user.updated_at = Utc::now();
        let updated = user.clone();

        match role {
            Role::Learner => {
                tables.ensure_learner(id);
                tables.set_coach_active(id, false);
            }
            Role::Coach => {
                tables.ensure_coach(id);
                tables.set_learner_active(id, false);
            }
            Role::Admin => {
                tables.set_learner_active(id, false);
                tables.set_coach_active(id, false);
            }
        }
        Ok(Some(updated))
    }

    async fn find_learner(&self, id: Uuid) -> StoreResult<Option<Learner>> {
        Ok(self.tables.read().await.learners.get(&id).cloned())
    }

    async fn find_learner_by_user(&self, user_id: Uuid) -> StoreResult<Option<Learner>> {
        let tables = self.tables.read().await;
        Ok(tables.learners.values().find(|l| l.user_id == user_id).cloned())
    }

    async fn set_learner_team(&self, user_id: Uuid, team_id: Option<Uuid>) -> StoreResult<Option<Learner>> {
        let mut tables = self.tables.write().await;
        Ok(tables.learner_by_user_mut(user_id).map(|learner| {
            learner.team_id = team_id;
            learner.updated_at = Utc::now();
            learner.clone()
        }))
    }

    async fn list_team_learners(&self, team_id: Uuid) -> StoreResult<Vec<Learner>> {
        let tables = self.tables.read().await;
        let mut learners: Vec<Learner> = tables
            .learners
            .values()
            .filter(|l| l.team_id == Some(team_id))
            .cloned()
            .collect();
        learners.sort_by_key(|l| l.created_at);
        Ok(learners)
    }

    async fn find_coach_by_user(&self, user_id: Uuid) -> StoreResult<Option<Coach>> {
        let tables = self.tables.read().await;
        Ok(tables.coaches.values().find(|c| c.user_id == user_id).cloned())
    }

    async fn set_learner_active(&self, user_id: Uuid, active: bool) -> StoreResult<Option<Learner>> {
        Ok(self.tables.write().await.set_learner_active(user_id, active))
    }

    async fn set_coach_active(&self, user_id: Uuid, active: bool) -> StoreResult<Option<Coach>> {
        Ok(self.tables.write().await.set_coach_active(user_id, active))
    }

    async fn list_teams(&self) -> StoreResult<Vec<Team>> {
        let mut teams: Vec<Team> = self.tables.read().await.teams.values().cloned().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn find_team(&self, id: Uuid) -> StoreResult<Option<Team>> {
        Ok(self.tables.read().await.teams.get(&id).cloned())
    }

    async fn insert_team(&self, team: NewTeam) -> StoreResult<Team> {
        let now = Utc::now();
        let created = Team { id: Uuid::new_v4(), name: team.name, active: team.active, created_at: now, updated_at: now };
        self.tables.write().await.teams.insert(created.id, created.clone());
        Ok(created)
    }

    async fn insert_reflection(&self, reflection: NewReflection) -> StoreResult<Reflection> {
        let created = Reflection {
            id: Uuid::new_v4(),
            learner_id: reflection.learner_id,
            title: reflection.title,
            content: reflection.content,
            week_start: reflection.week_start,
            created_at: Utc::now(),
            coach_feedback: None,
            coach_feedback_by: None,
            coach_feedback_at: None,
            ai_feedback: None,
            ai_prompt_version: None,
            ai_feedback_at: None,
        };
        self.tables.write().await.reflections.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_reflection(&self, id: Uuid) -> StoreResult<Option<Reflection>> {
        Ok(self.tables.read().await.reflections.get(&id).cloned())
    }

    async fn list_reflections(&self, learner_id: Option<Uuid>) -> StoreResult<Vec<Reflection>> {
        let tables = self.tables.read().await;
        let mut reflections: Vec<Reflection> = tables
            .reflections
            .values()
            .filter(|r| learner_id.map_or(true, |id| r.learner_id == id))
            .cloned()
            .collect();
        reflections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reflections)
    }

    async fn set_coach_feedback(&self, id: Uuid, feedback: &str, coach_user_id: Uuid) -> StoreResult<Option<Reflection>> {
        let mut tables = self.tables.write().await;
        Ok(tables.reflections.get_mut(&id).map(|r| {
            r.coach_feedback = Some(feedback.to_string());
            r.coach_feedback_by = Some(coach_user_id);
            r.coach_feedback_at = Some(Utc::now());
            r.clone()
        }))
    }

    async fn set_ai_feedback(&self, id: Uuid, feedback: &str, prompt_version: Option<i32>) -> StoreResult<Option<Reflection>> {
        let mut tables = self.tables.write().await;
        Ok(tables.reflections.get_mut(&id).map(|r| {
            r.ai_feedback = Some(feedback.to_string());
            r.ai_prompt_version = prompt_version;
            r.ai_feedback_at = Some(Utc::now());
            r.clone()
        }))
    }

    async fn insert_coaching_log(&self, log: NewCoachingLog) -> StoreResult<CoachingLog> {
        let now = Utc::now();
        let created = CoachingLog {
            id: Uuid::new_v4(),
            coach_id: log.coach_id,
            learner_id: log.learner_id,
            team_id: log.team_id,
            session_date: log.session_date,
            session_type: log.session_type,
            notes: log.notes,
            next_actions: log.next_actions,
            follow_up_date: log.follow_up_date,
            status: log.status,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.coaching_logs.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_coaching_log(&self, id: Uuid) -> StoreResult<Option<CoachingLog>> {
        Ok(self.tables.read().await.coaching_logs.get(&id).cloned())
    }

    async fn list_coaching_logs(&self, coach_id: Option<Uuid>) -> StoreResult<Vec<CoachingLog>> {
        let tables = self.tables.read().await;
        let mut logs: Vec<CoachingLog> = tables
            .coaching_logs
            .values()
            .filter(|l| coach_id.map_or(true, |id| l.coach_id == id))
            .cloned()
            .collect();
        logs.sort_by(|a, b| {
            b.session_date
                .cmp(&a.session_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(logs)
    }

    async fn upcoming_follow_ups(&self, coach_id: Option<Uuid>, from: NaiveDate, to: NaiveDate) -> StoreResult<Vec<CoachingLog>> {
        let tables = self.tables.read().await;
        let mut logs: Vec<CoachingLog> = tables
            .coaching_logs
            .values()
            .filter(|l| l.status == LogStatus::Open)
            .filter(|l| l.follow_up_date.map_or(false, |d| d >= from && d <= to))
            .filter(|l| coach_id.map_or(true, |id| l.coach_id == id))
            .cloned()
            .collect();
        logs.sort_by(|a, b| {
            a.follow_up_date
                .cmp(&b.follow_up_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(logs)
    }

    async fn set_coaching_log_status(&self, id: Uuid, status: LogStatus) -> StoreResult<Option<CoachingLog>> {
        let mut tables = self.tables.write().await;
        Ok(tables.coaching_logs.get_mut(&id).map(|l| {
            l.status = status;
            l.updated_at = Utc::now();
            l.clone()
        }))
    }

    async fn list_prompts(&self) -> StoreResult<Vec<PromptTemplate>> {
        let mut prompts: Vec<PromptTemplate> = self.tables.read().await.prompts.values().cloned().collect();
        prompts.sort_by(|a, b| a.purpose.cmp(&b.purpose).then_with(|| b.version.cmp(&a.version)));
        Ok(prompts)
    }

    async fn find_prompt(&self, id: Uuid) -> StoreResult<Option<PromptTemplate>> {
        Ok(self.tables.read().await.prompts.get(&id).cloned())
    }

    async fn insert_prompt(&self, prompt: NewPromptTemplate) -> StoreResult<PromptTemplate> {
        let now = Utc::now();
        let created = PromptTemplate {
            id: Uuid::new_v4(),
            name: prompt.name,
            purpose: prompt.purpose,
            content: prompt.content,
            version: prompt.version,
            active: false,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.prompts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn active_prompt(&self, purpose: &str) -> StoreResult<Option<PromptTemplate>> {
        let tables = self.tables.read().await;
        Ok(tables.prompts.values().find(|p| p.purpose == purpose && p.active).cloned())
    }

    async fn activate_prompt(&self, id: Uuid) -> StoreResult<Option<PromptTemplate>> {
        let mut tables = self.tables.write().await;
        let Some(purpose) = tables.prompts.get(&id).map(|p| p.purpose.clone()) else {
            return Ok(None);
        };

        let now = Utc::now();
        for prompt in tables.prompts.values_mut().filter(|p| p.purpose == purpose) {
            prompt.active = prompt.id == id;
            prompt.updated_at = now;
        }
        Ok(tables.prompts.get(&id).cloned())
    }
}
