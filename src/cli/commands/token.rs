use anyhow::Context;
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::{config, MAX_TOKEN_HOURS};

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(long, help = "Subject user id")]
    pub user: Uuid,

    #[arg(long, help = "Email claim, used when the user signs in for the first time")]
    pub email: Option<String>,

    #[arg(long, help = "Display name claim")]
    pub name: Option<String>,

    #[arg(
        long,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_HOURS),
        help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)"
    )]
    pub hours: Option<i64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    let claims = match args.hours {
        Some(hours) => Claims::with_expiry(args.user, args.email, args.name, security, chrono::Duration::hours(hours)),
        None => Claims::new(args.user, args.email, args.name, security),
    };
    let token = generate_jwt(&claims, security).context("failed to sign token")?;

    match output_format {
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
        OutputFormat::Json => output_success(
            output_format,
            "Token issued",
            Some(json!({ "token": token, "sub": claims.sub, "exp": claims.exp })),
        ),
    }
}
