use anyhow::Context;
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::cli::{utils::output_error, utils::output_success, OutputFormat};
use crate::config::config;
use crate::database::{DatabaseManager, PgStore, Store};
use crate::policy::Role;

#[derive(Debug, Args)]
pub struct RoleArgs {
    #[arg(help = "User id")]
    pub user_id: Uuid,

    #[arg(help = "learner, coach or admin", value_parser = parse_role)]
    pub role: Role,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse()
}

pub async fn handle(args: RoleArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database)
        .await
        .context("failed to connect to database")?;
    let store = PgStore::new(pool);

    match store.set_user_role(args.user_id, args.role).await? {
        Some(user) => output_success(
            output_format,
            &format!("{} is now {}", user.email, user.role),
            Some(json!({ "id": user.id, "role": user.role })),
        ),
        None => {
            output_error(output_format, &format!("User {} not found", args.user_id), Some("NOT_FOUND"))?;
            anyhow::bail!("user {} has not signed in yet", args.user_id)
        }
    }
}
