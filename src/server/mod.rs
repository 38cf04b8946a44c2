//! The axum application.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | dashboard, or the development welcome page without `shop` |
//! | `GET`/`POST /auth/login` | starts the install flow |
//! | `GET /auth/callback` | completes the install flow |
//! | `POST /app/uninstall` | `app/uninstalled` webhook |
//! | `POST /webhooks` | compliance webhooks |
//! | `GET /privacy`, `GET /terms` | legal pages |
//! | `GET /health` | liveness and storage counts |
//!
//! # Example
//!
//! ```rust,ignore
//! let state = AppState::new(config, Arc::new(MemoryStorage::new()));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router(state)).await?;
//! ```

mod auth;
mod error;
mod health;
mod home;
mod legal;
pub mod pages;
mod webhooks;

pub use auth::CALLBACK_PATH;
pub use error::{ApiError, ApiResult};

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::header::{HOST, LOCATION};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::config::AppConfig;
use crate::storage::Storage;

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Session and app data backend.
    pub storage: Arc<dyn Storage>,
    /// Pooled client for Shopify and ngrok calls.
    pub http: reqwest::Client,
}

impl AppState {
    /// Creates the state with a default HTTP client.
    #[must_use]
    pub fn new(config: AppConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            http: reqwest::Client::new(),
        }
    }

    /// Replaces the HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("storage", &self.storage.backend_name())
            .finish_non_exhaustive()
    }
}

/// Builds the router with every route and the request log.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::home))
        .route("/auth/login", get(auth::login).post(auth::login))
        .route(CALLBACK_PATH, get(auth::callback))
        .route(
            "/app/uninstall",
            post(webhooks::app_uninstall).fallback(webhooks::method_not_allowed),
        )
        .route(
            "/webhooks",
            post(webhooks::compliance).fallback(webhooks::method_not_allowed),
        )
        .route("/privacy", get(legal::privacy))
        .route("/terms", get(legal::terms))
        .route("/health", get(health::health))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request"
    );
    response
}

/// `302 Found` to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// Origin of the request as the client sees it, from `Host` and
/// `X-Forwarded-Proto` (default `http`).
pub(crate) fn request_origin(headers: &HeaderMap) -> Option<String> {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|h| !h.is_empty())?;
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("http");
    Some(format!("{proto}://{host}"))
}
