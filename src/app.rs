use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::{auth, health, pages};
use crate::middleware::route_guard;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Unguarded
        .route("/health", get(health::health))
        .merge(auth_routes())
        // Every page goes through the route guard
        .merge(page_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login/:role", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
}

fn page_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::landing))
        .route("/auth/callbackv1", get(auth::callback))
        .fallback(pages::page)
        .layer(middleware::from_fn_with_state(state, route_guard))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(origins).allow_credentials(true)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let port = config.server.port;
    let state = AppState::from_config(config)?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Travel Buddy listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
