use uuid::Uuid;

use super::{Caller, ServiceError, ServiceResult};
use crate::database::models::{PromptTemplate, DEFAULT_PROMPT_PURPOSE};
use crate::database::Store;
use crate::policy::Role;
use crate::schema::PromptTemplateInput;

pub async fn list(store: &dyn Store, caller: &Caller) -> ServiceResult<Vec<PromptTemplate>> {
    caller.require(Role::Admin)?;
    Ok(store.list_prompts().await?)
}

/// New templates start inactive.
pub async fn create(store: &dyn Store, caller: &Caller, input: PromptTemplateInput) -> ServiceResult<PromptTemplate> {
    caller.require(Role::Admin)?;
    let prompt = store.insert_prompt(input.validate()?).await?;
    tracing::info!(prompt = %prompt.id, purpose = %prompt.purpose, version = prompt.version, "prompt template created");
    Ok(prompt)
}

pub async fn active(store: &dyn Store, caller: &Caller, purpose: Option<&str>) -> ServiceResult<PromptTemplate> {
    caller.require(Role::Coach)?;
    let purpose = purpose.map(str::trim).filter(|p| !p.is_empty()).unwrap_or(DEFAULT_PROMPT_PURPOSE);
    store
        .active_prompt(purpose)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("No active prompt for purpose '{}'", purpose)))
}

/// Make `id` the only active template of its purpose.
pub async fn activate(store: &dyn Store, caller: &Caller, id: Uuid) -> ServiceResult<PromptTemplate> {
    caller.require(Role::Admin)?;
    let prompt = store
        .activate_prompt(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Prompt template not found".to_string()))?;
    tracing::info!(prompt = %id, purpose = %prompt.purpose, version = prompt.version, "prompt template activated");
    Ok(prompt)
}
