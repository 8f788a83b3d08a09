use anyhow::Context;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let database = &config().database;
    let url = database.url.as_deref().context("DATABASE_URL is not set")?;

    let pool = DatabaseManager::connect(database).await.context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;

    output_success(
        output_format,
        "Migrations applied",
        Some(json!({ "database": DatabaseManager::redact_url(url) })),
    )
}
