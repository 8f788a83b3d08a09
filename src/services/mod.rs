//! Role-scoped data access.
//!
//! Every function takes the store and the explicit [`Caller`] built for the current
//! request. Scoping happens here, before the store is touched: a row the caller may not
//! see is reported exactly like a missing one.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::User;
use crate::database::StoreError;
use crate::policy::{has_role, Role};
use crate::schema::FieldErrors;

pub mod coaching_logs;
pub mod prompts;
pub mod reflections;
pub mod teams;
pub mod users;

/// Authenticated identity for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Caller {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

impl Caller {
    /// Forbidden unless the caller's role satisfies `required`.
    pub fn require(&self, required: Role) -> ServiceResult<()> {
        if has_role(self.role, required) {
            Ok(())
        } else {
            tracing::warn!(user = %self.id, role = %self.role, required = %required, "access denied");
            Err(ServiceError::Forbidden(format!("Requires {} role", required)))
        }
    }

    /// True for callers with no role above learner.
    pub fn is_learner_only(&self) -> bool {
        !has_role(self.role, Role::Coach)
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed")]
    ValidationFailed(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::ValidationFailed(errors)
    }
}

/// Single-field validation failure.
pub(crate) fn field_error(field: &str, message: impl Into<String>) -> ServiceError {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), message.into());
    ServiceError::ValidationFailed(errors)
}
