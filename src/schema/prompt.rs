use serde::Deserialize;

use super::{FieldErrors, Violations};
use crate::database::models::{NewPromptTemplate, DEFAULT_PROMPT_PURPOSE};

pub const NAME_MAX: usize = 100;
pub const PURPOSE_MAX: usize = 50;
pub const CONTENT_MAX: usize = 20_000;

/// Body of `POST /ai-prompts`
#[derive(Debug, Default, Deserialize)]
pub struct PromptTemplateInput {
    pub name: Option<String>,
    pub purpose: Option<String>,
    pub content: Option<String>,
    pub version: Option<i64>,
}

impl PromptTemplateInput {
    pub fn validate(self) -> Result<NewPromptTemplate, FieldErrors> {
        let mut v = Violations::new();
        let name = v.text("name", self.name, 1, NAME_MAX, true);
        let content = v.text("content", self.content, 1, CONTENT_MAX, false);

        let purpose = match self.purpose {
            Some(raw) => v.text("purpose", Some(raw), 1, PURPOSE_MAX, true).filter(|p| {
                let ok = p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
                if !ok {
                    v.add("purpose", "Use lowercase letters, digits and underscores only");
                }
                ok
            }),
            None => Some(DEFAULT_PROMPT_PURPOSE.to_string()),
        };

        let version = match self.version {
            None => Some(1),
            Some(n) if (1..=i32::MAX as i64).contains(&n) => Some(n as i32),
            Some(_) => {
                v.add("version", "Must be a positive integer");
                None
            }
        };

        match (name, purpose, content, version) {
            (Some(name), Some(purpose), Some(content), Some(version)) if v.is_empty() => {
                Ok(NewPromptTemplate { name, purpose, content, version })
            }
            _ => Err(v.into_errors()),
        }
    }
}
