mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_reports_local_validator() -> Result<()> {
    let server = common::spawn_app(common::jwt_config()).await?;

    let res = common::client().get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["validator"], "jwt");
    Ok(())
}

#[tokio::test]
async fn health_checks_auth_service() -> Result<()> {
    let auth = common::spawn_auth_service().await?;
    let server = common::spawn_app(common::remote_config(&auth.base_url)).await?;

    let res = common::client().get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await?["data"]["auth"], "ok");
    Ok(())
}

#[tokio::test]
async fn health_degrades_when_auth_service_is_down() -> Result<()> {
    let server = common::spawn_app(common::remote_config(&common::dead_url())).await?;

    let res = common::client().get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["status"], "degraded");
    Ok(())
}
