use clap::Args;
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::auth::Role;
use crate::cli::utils::{output_details, output_success};
use crate::cli::{CliContext, OutputFormat};
use crate::database::models::{SourceCreate, UserCreate};
use crate::services::{SourceService, UserService};

pub const CO2_SOURCE: &str = "CO2 Emissions Dataset";
pub const AIR_QUALITY_SOURCE: &str = "Global Air Quality Dataset";

#[derive(Args)]
pub struct InitArgs {
    #[arg(long, default_value = "admin123", help = "Password for admin@ecotrack.com")]
    pub admin_password: String,

    #[arg(long, default_value = "user123", help = "Password for user@ecotrack.com")]
    pub user_password: String,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct InitSummary {
    pub sources_created: usize,
    pub users_created: usize,
}

fn default_sources() -> Vec<SourceCreate> {
    vec![
        SourceCreate {
            name: CO2_SOURCE.to_string(),
            origin: "Carbon Monitor".to_string(),
            description: Some("Daily CO2 emissions by country and sector".to_string()),
        },
        SourceCreate {
            name: AIR_QUALITY_SOURCE.to_string(),
            origin: "Environmental Monitoring Network".to_string(),
            description: Some("City-level pollutant and weather measurements".to_string()),
        },
    ]
}

/// Seed default sources and accounts, leaving existing rows alone
pub async fn seed(pool: &SqlitePool, bcrypt_cost: u32, admin_password: &str, user_password: &str) -> anyhow::Result<InitSummary> {
    let mut summary = InitSummary::default();

    let sources = SourceService::new(pool.clone());
    for source in default_sources() {
        if sources.find_by_name(&source.name).await?.is_some() {
            tracing::debug!("Source '{}' already present", source.name);
            continue;
        }
        sources.create(source).await?;
        summary.sources_created += 1;
    }

    let users = UserService::new(pool.clone(), bcrypt_cost);
    let accounts = [
        ("admin", "admin@ecotrack.com", admin_password, Role::Admin),
        ("testuser", "user@ecotrack.com", user_password, Role::User),
    ];
    for (username, email, password, role) in accounts {
        if users.get_by_email(email).await?.is_some() {
            tracing::debug!("User '{}' already present", email);
            continue;
        }
        users
            .create(UserCreate {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role: role.as_str().to_string(),
            })
            .await?;
        summary.users_created += 1;
    }

    Ok(summary)
}

pub async fn handle(args: InitArgs, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let summary = seed(
        &ctx.pool,
        ctx.config.security.bcrypt_cost,
        &args.admin_password,
        &args.user_password,
    )
    .await?;

    output_success(
        &output_format,
        &format!("Database initialized at {}", ctx.config.database.url),
        Some(json!({ "summary": summary })),
    )?;
    output_details(
        &output_format,
        &[
            ("Sources created", summary.sources_created.to_string()),
            ("Users created", summary.users_created.to_string()),
        ],
    );
    Ok(())
}
