//! Input contracts for every write.
//!
//! Each `*Input` is the loosely-typed request body; `validate()` turns it into a typed
//! value or returns every field error at once (field name → message).

use chrono::NaiveDate;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

pub mod coaching_log;
pub mod prompt;
pub mod reflection;
pub mod team;
pub mod user;

pub use coaching_log::{CoachingLogDraft, CoachingLogInput, CoachingLogStatusInput};
pub use prompt::PromptTemplateInput;
pub use reflection::{AiFeedbackInput, CoachFeedbackInput, ReflectionDraft, ReflectionInput};
pub use team::{LearnerTeamAssignment, LearnerTeamAssignmentInput, LearnerTeamRemovalInput, TeamInput};
pub use user::{ProfileUpdateInput, RoleChangeInput};

/// Field name → human-readable message.
pub type FieldErrors = HashMap<String, String>;

/// Collects field errors while a validator walks its input. The first error per field wins.
#[derive(Debug, Default)]
pub struct Violations {
    errors: FieldErrors,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    /// Text with a length bound in characters. `trim` strips surrounding whitespace first.
    pub fn text(&mut self, field: &str, value: Option<String>, min: usize, max: usize, trim: bool) -> Option<String> {
        let Some(raw) = value else {
            self.add(field, "This field is required");
            return None;
        };
        let value = if trim { raw.trim().to_string() } else { raw };
        let len = value.chars().count();
        if len < min {
            if min <= 1 {
                self.add(field, "Must not be blank");
            } else {
                self.add(field, format!("Must be at least {} characters", min));
            }
            return None;
        }
        if len > max {
            self.add(field, format!("Must be at most {} characters", max));
            return None;
        }
        Some(value)
    }

    /// Optional trimmed text; blank is treated as absent.
    pub fn optional_text(&mut self, field: &str, value: Option<String>, max: usize) -> Option<String> {
        let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
        if value.chars().count() > max {
            self.add(field, format!("Must be at most {} characters", max));
            return None;
        }
        Some(value)
    }

    pub fn date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        let Some(raw) = value else {
            self.add(field, "This field is required");
            return None;
        };
        self.parse_date(field, raw)
    }

    pub fn optional_date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => self.parse_date(field, raw),
            None => None,
        }
    }

    fn parse_date(&mut self, field: &str, raw: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.add(field, format!("Invalid date format: {} (expected YYYY-MM-DD)", raw));
                None
            }
        }
    }

    pub fn uuid(&mut self, field: &str, value: Option<&str>) -> Option<Uuid> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            self.add(field, "This field is required");
            return None;
        };
        self.parse_uuid(field, raw)
    }

    pub fn optional_uuid(&mut self, field: &str, value: Option<&str>) -> Option<Uuid> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => self.parse_uuid(field, raw),
            None => None,
        }
    }

    fn parse_uuid(&mut self, field: &str, raw: &str) -> Option<Uuid> {
        match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                self.add(field, format!("Invalid UUID format: {}", raw));
                None
            }
        }
    }

    /// One of a closed set of values.
    pub fn one_of<T: FromStr>(&mut self, field: &str, value: Option<&str>, allowed: &[&str]) -> Option<T> {
        let Some(raw) = value else {
            self.add(field, "This field is required");
            return None;
        };
        match raw.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.add(field, format!("Must be one of: {}", allowed.join(", ")));
                None
            }
        }
    }
}
