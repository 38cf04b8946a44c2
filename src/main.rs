//! Shopify embedded app server.
//!
//! Reads its configuration from the environment (see `.env.example`), then
//! serves the app on `0.0.0.0:{PORT}` until Ctrl-C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shopify_app::server::{router, AppState, CALLBACK_PATH};
use shopify_app::storage::{MemoryStorage, MongoStorage, Storage};
use shopify_app::{AppConfig, StorageBackend};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "shopify_app=info";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    info!("shopify-embedded-app v{VERSION} starting");

    let config = AppConfig::from_env().context("invalid configuration")?;

    let api_version = config.shopify().api_version();
    if api_version.is_deprecated() {
        warn!(
            api_version = %api_version,
            "configured Admin API version is no longer supported by Shopify"
        );
    }

    let storage = connect_storage(config.storage()).await?;
    info!(storage = storage.backend_name(), "session storage ready");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port()));
    let callback_url = match config.app_url() {
        Some(url) => Some(format!("{}{CALLBACK_PATH}", url.origin())),
        None => config
            .fallback_app_url()
            .ok()
            .map(|url| format!("{}{CALLBACK_PATH}", url.origin())),
    };

    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;
    let state = AppState::new(config, storage).with_http_client(http);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "listening");
    if let Some(callback_url) = callback_url {
        info!(
            %callback_url,
            "register this callback URL in the Partner Dashboard, the login route logs the tunnel URL when ngrok runs"
        );
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("failed to create env filter")?;

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .try_init(),
    }
    .context("failed to install tracing subscriber")
}

async fn connect_storage(backend: &StorageBackend) -> Result<Arc<dyn Storage>> {
    match backend {
        StorageBackend::Mongo { url, database } => {
            info!(database = %database, "connecting to MongoDB");
            let storage = MongoStorage::connect(url, database)
                .await
                .context("failed to connect to MongoDB")?;
            Ok(Arc::new(storage))
        }
        StorageBackend::Memory => {
            warn!("using in-memory session storage, sessions are lost on restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => {
                warn!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("SIGTERM received, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
