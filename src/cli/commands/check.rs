use clap::Args;
use serde_json::json;

use crate::cli::utils::{output_fields, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::session::Session;
use crate::state::AppState;

#[derive(Args)]
pub struct CheckArgs {
    #[arg(help = "Page path, e.g. /dashboard/user")]
    pub path: String,

    #[arg(long, help = "Bearer token stored in the session")]
    pub token: Option<String>,

    #[arg(long, help = "Role stored in the session (user or business)")]
    pub role: Option<String>,
}

pub async fn handle(args: CheckArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = AppState::from_config(AppConfig::from_env())?;
    let session = Session::from_parts(args.token, args.role);

    let (validity, verdict) = state.guard.evaluate(&args.path, &session).await;

    let message = match verdict.decision.target() {
        Some(target) => format!("{} redirects to {}", args.path, target),
        None => format!("{} is allowed", args.path),
    };

    output_success(
        &output_format,
        &message,
        Some(json!({
            "path": args.path,
            "role": session.role,
            "validity": validity,
            "rule": verdict.rule,
            "decision": verdict.decision,
        })),
    )?;

    output_fields(
        &output_format,
        &[
            ("rule", json!(verdict.rule)),
            ("validity", json!(validity)),
        ],
    )
}
