use chrono::NaiveDate;
use serde::Deserialize;

use super::{FieldErrors, Violations};

pub const TITLE_MAX: usize = 200;
pub const CONTENT_MIN: usize = 100;
pub const CONTENT_MAX: usize = 10_000;
pub const COACH_FEEDBACK_MAX: usize = 5_000;
pub const AI_FEEDBACK_MAX: usize = 10_000;

/// Body of `POST /reflections`
#[derive(Debug, Default, Deserialize)]
pub struct ReflectionInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub week_start: Option<String>,
}

/// A reflection that passed validation, not yet tied to a learner.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionDraft {
    pub title: String,
    pub content: String,
    pub week_start: NaiveDate,
}

impl ReflectionInput {
    pub fn validate(self) -> Result<ReflectionDraft, FieldErrors> {
        let mut v = Violations::new();
        let title = v.text("title", self.title, 1, TITLE_MAX, true);
        // Content length is measured as submitted.
        let content = v.text("content", self.content, CONTENT_MIN, CONTENT_MAX, false);
        let week_start = v.date("week_start", self.week_start.as_deref());

        match (title, content, week_start) {
            (Some(title), Some(content), Some(week_start)) if v.is_empty() => {
                Ok(ReflectionDraft { title, content, week_start })
            }
            _ => Err(v.into_errors()),
        }
    }
}

/// Body of `POST /reflections/:id/feedback`
#[derive(Debug, Default, Deserialize)]
pub struct CoachFeedbackInput {
    pub coach_feedback: Option<String>,
}

impl CoachFeedbackInput {
    pub fn validate(self) -> Result<String, FieldErrors> {
        let mut v = Violations::new();
        v.text("coach_feedback", self.coach_feedback, 1, COACH_FEEDBACK_MAX, true)
            .ok_or_else(|| v.into_errors())
    }
}

/// Body of `PUT /reflections/:id/ai-feedback`
#[derive(Debug, Default, Deserialize)]
pub struct AiFeedbackInput {
    pub ai_feedback: Option<String>,
}

impl AiFeedbackInput {
    pub fn validate(self) -> Result<String, FieldErrors> {
        let mut v = Violations::new();
        v.text("ai_feedback", self.ai_feedback, 1, AI_FEEDBACK_MAX, true)
            .ok_or_else(|| v.into_errors())
    }
}
