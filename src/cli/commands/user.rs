use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{CliContext, OutputFormat};
use crate::database::models::{UserCreate, UserResponse};
use crate::services::UserService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user account")]
    Create {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "user", help = "user or admin")]
        role: String,
    },
}

pub async fn handle(cmd: UserCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create {
            username,
            email,
            password,
            role,
        } => {
            let users = UserService::new(ctx.pool.clone(), ctx.config.security.bcrypt_cost);
            let user = users
                .create(UserCreate {
                    username,
                    email,
                    password,
                    role,
                })
                .await?;

            let user = UserResponse::from(user);
            output_success(
                &output_format,
                &format!("Created {} '{}' ({})", user.role, user.username, user.email),
                Some(json!({ "user": user })),
            )
        }
    }
}
