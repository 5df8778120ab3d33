use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Fail closed when the token validator is unreachable")]
    pub fail_closed: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.fail_closed {
        config.guard.fail_open = false;
    }

    crate::app::serve(config).await
}
