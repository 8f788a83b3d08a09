use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::{FieldErrors, Violations};
use crate::database::models::{LogStatus, SessionType};

pub const NOTES_MAX: usize = 5_000;
pub const NEXT_ACTIONS_MAX: usize = 2_000;

/// Body of `POST /coaching-logs`
#[derive(Debug, Default, Deserialize)]
pub struct CoachingLogInput {
    pub learner_id: Option<String>,
    pub team_id: Option<String>,
    pub session_date: Option<String>,
    pub session_type: Option<String>,
    pub notes: Option<String>,
    pub next_actions: Option<String>,
    pub follow_up_date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoachingLogDraft {
    pub learner_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub session_date: NaiveDate,
    pub session_type: SessionType,
    pub notes: String,
    pub next_actions: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub status: LogStatus,
}

impl CoachingLogInput {
    pub fn validate(self) -> Result<CoachingLogDraft, FieldErrors> {
        let mut v = Violations::new();

        let learner_id = v.optional_uuid("learner_id", self.learner_id.as_deref());
        let team_id = v.optional_uuid("team_id", self.team_id.as_deref());
        if learner_id.is_none() && team_id.is_none() && !v.has("learner_id") && !v.has("team_id") {
            v.add("learner_id", "Either learner_id or team_id is required");
        }

        let session_date = v.date("session_date", self.session_date.as_deref());
        let session_type = v.one_of::<SessionType>("session_type", self.session_type.as_deref(), SessionType::VALUES);
        let notes = v.text("notes", self.notes, 1, NOTES_MAX, true);
        let next_actions = v.optional_text("next_actions", self.next_actions, NEXT_ACTIONS_MAX);
        let follow_up_date = v.optional_date("follow_up_date", self.follow_up_date.as_deref());

        if let (Some(session), Some(follow_up)) = (session_date, follow_up_date) {
            if follow_up < session {
                v.add("follow_up_date", "Follow-up date cannot be before the session date");
            }
        }

        let status = match self.status.as_deref() {
            Some(raw) => v.one_of::<LogStatus>("status", Some(raw), LogStatus::VALUES),
            None => Some(LogStatus::Open),
        };

        match (session_date, session_type, notes, status) {
            (Some(session_date), Some(session_type), Some(notes), Some(status)) if v.is_empty() => {
                Ok(CoachingLogDraft {
                    learner_id,
                    team_id,
                    session_date,
                    session_type,
                    notes,
                    next_actions,
                    follow_up_date,
                    status,
                })
            }
            _ => Err(v.into_errors()),
        }
    }
}

/// Body of `PATCH /coaching-logs/:id/status`
#[derive(Debug, Default, Deserialize)]
pub struct CoachingLogStatusInput {
    pub status: Option<String>,
}

impl CoachingLogStatusInput {
    pub fn validate(self) -> Result<LogStatus, FieldErrors> {
        let mut v = Violations::new();
        v.one_of::<LogStatus>("status", self.status.as_deref(), LogStatus::VALUES)
            .ok_or_else(|| v.into_errors())
    }
}
