pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "reflect")]
#[command(about = "Reflect CLI - operational commands for the Reflect API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply database migrations (requires DATABASE_URL)")]
    Migrate,

    #[command(about = "Issue a signed access token for local development and testing")]
    Token(commands::token::TokenArgs),

    #[command(about = "Set a user's role directly in the database (bootstrap the first admin)")]
    Role(commands::role::RoleArgs),

    #[command(about = "Check a running server's /health endpoint")]
    Ping(commands::ping::PingArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Role(args) => commands::role::handle(args, output_format).await,
        Commands::Ping(args) => commands::ping::handle(args, output_format).await,
    }
}
