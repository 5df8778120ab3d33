use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up AUTH_SERVICE_URL, AUTH_API_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = travel_buddy::config::config();
    tracing::info!("Starting Travel Buddy in {:?} mode", config.environment);

    if travel_buddy::is_production!() && config.guard.fail_open {
        tracing::warn!("GUARD_FAIL_OPEN is enabled in production; validator outages will grant access");
    }

    travel_buddy::app::serve(config.clone()).await
}
