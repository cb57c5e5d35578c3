pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::config::{self, AppConfig};
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "ecotrack")]
#[command(about = "EcoTrack CLI - database setup and dataset loading")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Database URL (overrides DATABASE_URL)")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the schema and seed default sources and accounts")]
    Init(commands::init::InitArgs),

    #[command(about = "Load a CSV dataset")]
    Load {
        #[command(subcommand)]
        cmd: commands::load::LoadCommands,
    },

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Database handle and settings shared by every command
pub struct CliContext {
    pub pool: SqlitePool,
    pub config: AppConfig,
}

impl CliContext {
    pub async fn open(database_url: Option<String>) -> anyhow::Result<Self> {
        let mut config = config::config().clone();
        if let Some(url) = database_url {
            config.database.url = url;
        }
        let pool = DatabaseManager::connect(&config.database).await?;
        Ok(Self { pool, config })
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = CliContext::open(cli.database_url).await?;

    match cli.command {
        Commands::Init(args) => commands::init::handle(args, &ctx, output_format).await,
        Commands::Load { cmd } => commands::load::handle(cmd, &ctx, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, &ctx, output_format).await,
    }
}
