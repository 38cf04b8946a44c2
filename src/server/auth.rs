//! Install flow routes.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::Duration;
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::oauth::{begin_auth, validate_auth_callback, validate_hmac, AuthQuery, OAuthError};
use crate::auth::session::STATE_TTL_MINUTES;
use crate::auth::Session;
use crate::config::ShopDomain;
use crate::server::{found, request_origin, ApiError, ApiResult, AppState};
use crate::tunnel::resolve_app_url;

/// Path Shopify redirects to after the merchant approves the install.
pub const CALLBACK_PATH: &str = "/auth/callback";

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    shop: Option<String>,
}

fn required_shop(raw: Option<&str>) -> ApiResult<ShopDomain> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing shop parameter".to_string()))?;
    ShopDomain::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// `GET|POST /auth/login?shop=...`: stores a state record and redirects to
/// Shopify's authorize page.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> ApiResult<Response> {
    let shop = required_shop(query.shop.as_deref())?;

    let app_url = resolve_app_url(
        &state.http,
        &state.config,
        request_origin(&headers).as_deref(),
    )
    .await?;

    let auth = begin_auth(
        state.config.shopify(),
        &app_url,
        &shop,
        CALLBACK_PATH,
        false,
        None,
    );

    info!(
        shop = %shop,
        callback_url = %auth.redirect_uri,
        "starting OAuth, the callback URL must be listed in the Partner Dashboard"
    );

    let record = Session::state_record(
        shop,
        auth.state.as_ref(),
        Duration::minutes(STATE_TTL_MINUTES),
    );
    state.storage.store_session(&record).await?;

    Ok(found(&auth.auth_url))
}

/// `GET /auth/callback`: validates the callback, stores the session and
/// redirects to the app home.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<AuthQuery>,
) -> ApiResult<Response> {
    let shop = required_shop(Some(&query.shop))?;
    let shopify = state.config.shopify();

    let state_id = Session::state_id(&query.state);
    let pending = if query.state.is_empty() {
        None
    } else {
        state.storage.load_session(&state_id).await?
    };

    let expected_state = pending
        .filter(|record| !record.expired() && record.shop == shop)
        .and_then(|record| record.state);

    let Some(expected_state) = expected_state else {
        if !validate_hmac(&query, shopify) {
            return Err(OAuthError::InvalidHmac.into());
        }
        warn!(shop = %shop, "OAuth callback without a pending login");
        return Err(OAuthError::StateMismatch {
            expected: String::new(),
            received: query.state.clone(),
        }
        .into());
    };

    let session = validate_auth_callback(&state.http, shopify, &query, &expected_state).await?;
    state.storage.store_session(&session).await?;
    state.storage.delete_session(&state_id).await?;

    info!(
        shop = %session.shop,
        session_id = %session.id,
        scopes = %session.scopes,
        "app installed"
    );

    let location = format!(
        "/?shop={}&host={}",
        urlencoding::encode(session.shop.as_ref()),
        urlencoding::encode(&query.host)
    );
    Ok(found(&location))
}
