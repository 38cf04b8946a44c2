//! Privacy policy and terms of service pages.

use axum::extract::State;
use axum::response::Html;
use chrono::Utc;

use crate::server::pages::{privacy_page, terms_page};
use crate::server::AppState;

/// `GET /privacy`
pub async fn privacy(State(state): State<AppState>) -> Html<String> {
    Html(privacy_page(
        state.config.shopify().api_key().as_ref(),
        Utc::now().date_naive(),
    ))
}

/// `GET /terms`
pub async fn terms(State(state): State<AppState>) -> Html<String> {
    Html(terms_page(
        state.config.shopify().api_key().as_ref(),
        Utc::now().date_naive(),
    ))
}
