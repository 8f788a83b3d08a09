use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    OneOnOne,
    Group,
    CheckIn,
}

impl SessionType {
    pub const VALUES: &'static [&'static str] = &["one_on_one", "group", "check_in"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::OneOnOne => "one_on_one",
            SessionType::Group => "group",
            SessionType::CheckIn => "check_in",
        }
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_on_one" => Ok(SessionType::OneOnOne),
            "group" => Ok(SessionType::Group),
            "check_in" => Ok(SessionType::CheckIn),
            other => Err(format!("invalid session type: {}", other)),
        }
    }
}

/// Follow-up status. Moves `open -> done` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Open,
    Done,
}

impl LogStatus {
    pub const VALUES: &'static [&'static str] = &["open", "done"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Open => "open",
            LogStatus::Done => "done",
        }
    }

    pub fn can_transition_to(&self, next: LogStatus) -> bool {
        !matches!((self, next), (LogStatus::Done, LogStatus::Open))
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(LogStatus::Open),
            "done" => Ok(LogStatus::Done),
            other => Err(format!("invalid status: {}", other)),
        }
    }
}

/// A coach's record of a session with a learner, a team, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingLog {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub learner_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub session_date: NaiveDate,
    pub session_type: SessionType,
    pub notes: String,
    pub next_actions: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub status: LogStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCoachingLog {
    pub coach_id: Uuid,
    pub learner_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub session_date: NaiveDate,
    pub session_type: SessionType,
    pub notes: String,
    pub next_actions: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub status: LogStatus,
}
