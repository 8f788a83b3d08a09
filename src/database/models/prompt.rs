use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Purpose used when a template does not name one.
pub const DEFAULT_PROMPT_PURPOSE: &str = "reflection_feedback";

/// Versioned AI prompt text. At most one template is active per `purpose`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PromptTemplate {
    pub id: Uuid,
    pub name: String,
    pub purpose: String,
    pub content: String,
    pub version: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPromptTemplate {
    pub name: String,
    pub purpose: String,
    pub content: String,
    pub version: i32,
}
