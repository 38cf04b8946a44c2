//! Integration tests for the HTML pages and the health check.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use shopify_app::server::pages::last_updated;
use shopify_app::server::{router, AppState};
use shopify_app::storage::{MemoryStorage, SessionStorage};
use shopify_app::{
    ApiKey, ApiSecretKey, AppConfig, AppEnv, HostUrl, Session, ShopDomain, ShopifyConfig,
    StorageBackend,
};
use tower::ServiceExt;

fn config() -> AppConfig {
    let shopify = ShopifyConfig::builder()
        .api_key(ApiKey::new("pages-api-key").unwrap())
        .api_secret_key(ApiSecretKey::new("secret").unwrap())
        .build()
        .unwrap();
    AppConfig::new(shopify, StorageBackend::Memory)
}

fn app_with(config: AppConfig) -> (Router, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (router(AppState::new(config, storage.clone())), storage)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::HOST, "localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_home_without_shop_shows_welcome_page() {
    let (app, _) = app_with(config());

    let (status, content_type, html) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(html.contains("Welcome to Your Shopify App"));
    assert!(html.contains("Development Mode"));
    assert!(html.contains(r#"<meta name="shopify-api-key" content="pages-api-key">"#));
    assert!(html.contains("http://localhost:3000?shop=your-store.myshopify.com"));
}

#[tokio::test]
async fn test_welcome_page_prefers_app_url() {
    let config = config()
        .with_env(AppEnv::Production)
        .with_app_url(HostUrl::new("https://app.example.com/").unwrap());
    let (app, _) = app_with(config);

    let (_, _, html) = get(&app, "/").await;
    assert!(html.contains("<code>https://app.example.com</code>"));
}

#[tokio::test]
async fn test_home_with_invalid_shop_is_bad_request() {
    let (app, _) = app_with(config());

    let (status, _, _) = get(&app, "/?shop=not%20a%20shop").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_home_ignores_expired_sessions() {
    let (app, storage) = app_with(config());
    let shop = ShopDomain::new("expired").unwrap();
    storage
        .store_session(&Session::new(
            "expired.myshopify.com_42".to_string(),
            shop,
            "shpua_online".to_string(),
            "read_products".parse().unwrap(),
            true,
            Some(Utc::now() - chrono::Duration::hours(1)),
        ))
        .await
        .unwrap();

    let (status, _, _) = get(&app, "/?shop=expired.myshopify.com").await;
    assert_eq!(status, StatusCode::FOUND);
}

#[tokio::test]
async fn test_privacy_page() {
    let (app, _) = app_with(config());

    let (status, _, html) = get(&app, "/privacy").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<title>Privacy Policy - Shopify App</title>"));
    assert!(html.contains("Information We Collect"));
    assert!(html.contains("Request data portability"));
    assert!(html.contains(&last_updated(Utc::now().date_naive())));
}

#[tokio::test]
async fn test_terms_page() {
    let (app, _) = app_with(config());

    let (status, _, html) = get(&app, "/terms").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<title>Terms of Service - Shopify App</title>"));
    assert!(html.contains("Limitation of Liability"));
    assert!(html.contains("Contact Information"));
}

#[tokio::test]
async fn test_health_reports_storage_counts() {
    let (app, storage) = app_with(config());
    for name in ["alpha", "beta"] {
        let shop = ShopDomain::new(name).unwrap();
        storage
            .store_session(&Session::new(
                Session::offline_id(&shop),
                shop,
                "shpat".to_string(),
                "read_products".parse().unwrap(),
                false,
                None,
            ))
            .await
            .unwrap();
    }

    let (status, _, body) = get(&app, "/health").await;
    let json: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({"status": "ok", "storage": "memory", "sessionCount": 2, "shopCount": 2})
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = app_with(config());

    let (status, _, _) = get(&app, "/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
