use axum::extract::State;
use storefront_api::{
    config::AppConfig,
    routes::{doc::ApiDoc, health::health_check},
    state::AppState,
};
use utoipa::OpenApi;

#[tokio::test]
async fn health_check_reports_database() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping health test: TEST_DATABASE_URL or DATABASE_URL not set");
            return Ok(());
        }
    };

    let state = AppState::connect(AppConfig::for_database(database_url)).await?;
    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.ok_or_else(|| anyhow::anyhow!("health data"))?;
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "up");
    Ok(())
}

#[test]
fn openapi_documents_public_and_admin_routes() {
    let doc = ApiDoc::openapi();
    for path in ["/health", "/api/orders", "/api/admin/orders/{id}/status"] {
        assert!(doc.paths.paths.contains_key(path), "{path} missing");
    }

    let has_bearer = doc
        .components
        .as_ref()
        .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"));
    assert!(has_bearer);
}
