//! App home.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::warn;

use crate::clients::GraphqlClient;
use crate::config::ShopDomain;
use crate::server::pages::{dashboard_page, welcome_page};
use crate::server::{found, request_origin, ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    shop: Option<String>,
}

/// `GET /`
///
/// - no `shop`: development welcome page
/// - no active session granting the configured scopes: redirect to `/auth/login`
/// - otherwise: the dashboard, with shop details when the Admin API answers
pub async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HomeQuery>,
) -> ApiResult<Response> {
    let api_key = state.config.shopify().api_key().as_ref();

    let Some(raw) = query.shop.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        let app_url = match state.config.app_url() {
            Some(url) => url.origin().to_string(),
            None => match request_origin(&headers) {
                Some(origin) => origin,
                None => state.config.fallback_app_url()?.origin().to_string(),
            },
        };
        return Ok(Html(welcome_page(api_key, &app_url)).into_response());
    };

    let shop = ShopDomain::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let required = state.config.shopify().scopes();
    let session = state
        .storage
        .find_sessions_by_shop(&shop)
        .await?
        .into_iter()
        .find(|session| session.is_active() && session.scopes.covers(required));

    let Some(session) = session else {
        return Ok(found(&format!(
            "/auth/login?shop={}",
            urlencoding::encode(shop.as_ref())
        )));
    };

    let client = GraphqlClient::new(&session, state.config.shopify(), state.http.clone());
    let shop_info = match client.fetch_shop_info().await {
        Ok(info) => info,
        Err(e) => {
            warn!(shop = %shop, status = ?e.status(), error = %e, "Error fetching shop info");
            None
        }
    };

    Ok(Html(dashboard_page(api_key, shop_info.as_ref())).into_response())
}
