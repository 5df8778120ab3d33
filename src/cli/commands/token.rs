use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::session::Role;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint an HS256 token signed with AUTH_JWT_SECRET")]
    Issue {
        #[arg(long, help = "Role claim (user or business)")]
        role: Option<String>,
        #[arg(long, help = "Email claim")]
        email: Option<String>,
        #[arg(long, help = "Subject id (random when omitted)")]
        sub: Option<Uuid>,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { role, email, sub, hours } => {
            let config = AppConfig::from_env();
            let role = role.map(|r| r.parse::<Role>()).transpose()?;
            let sub = sub.unwrap_or_else(Uuid::new_v4);
            let hours = hours.unwrap_or(config.security.jwt_expiry_hours);

            let claims = Claims::new(sub, email, role, hours)?;
            let token = generate_jwt(&claims, &config.auth.jwt_secret)?;

            match output_format {
                OutputFormat::Text => println!("{}", token),
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({ "token": token, "sub": sub, "exp": claims.exp })),
                )?,
            }
            Ok(())
        }
    }
}
