use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Weekly reflection as stored, feedback fields included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Reflection {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub title: String,
    pub content: String,
    pub week_start: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub coach_feedback: Option<String>,
    pub coach_feedback_by: Option<Uuid>,
    pub coach_feedback_at: Option<DateTime<Utc>>,
    pub ai_feedback: Option<String>,
    pub ai_prompt_version: Option<i32>,
    pub ai_feedback_at: Option<DateTime<Utc>>,
}

/// Learner-facing projection: no coach or AI feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerReflection {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub title: String,
    pub content: String,
    pub week_start: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<Reflection> for LearnerReflection {
    fn from(r: Reflection) -> Self {
        Self {
            id: r.id,
            learner_id: r.learner_id,
            title: r.title,
            content: r.content,
            week_start: r.week_start,
            created_at: r.created_at,
        }
    }
}

/// Role-appropriate view of a reflection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReflectionView {
    Learner(LearnerReflection),
    Full(Reflection),
}

impl ReflectionView {
    pub fn id(&self) -> Uuid {
        match self {
            ReflectionView::Learner(r) => r.id,
            ReflectionView::Full(r) => r.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReflection {
    pub learner_id: Uuid,
    pub title: String,
    pub content: String,
    pub week_start: NaiveDate,
}
