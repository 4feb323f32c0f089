//! The RSS server's axum routes: the dynamic feed
//! endpoint, a legacy static-path redirect, and a health check.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use tracing::warn;

use crate::feed::build_channel;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/daily-digest.xml", get(daily_digest_xml))
        // Older clients/readers may still have the pre-dynamic static
        // file bookmarked. Redirect them rather than 404.
        .route("/podcast.xml", get(legacy_redirect))
        .route("/feed.xml", get(legacy_redirect))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn legacy_redirect() -> Redirect {
    Redirect::permanent("/daily-digest.xml")
}

/// `GET /daily-digest.xml`: queries published digests
/// fresh on every request — no static file is ever materialized — and
/// emits the `Cache-Control` headers the edge cache requires.
async fn daily_digest_xml(State(state): State<Arc<AppState>>) -> Response {
    let settings = match feedcast_store::load_settings(&state.pool).await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "failed to load settings for RSS render");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let published = match feedcast_store::digests::list_published_with_topic(&state.pool).await {
        Ok(published) => published,
        Err(e) => {
            warn!(error = %e, "failed to load published digests for RSS render");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let channel = match build_channel(&published, &settings.rss, settings.display_timezone) {
        Ok(channel) => channel,
        Err(e) => {
            warn!(error = %e, "failed to render RSS channel");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let body = channel.to_string();
    let cache_control = format!(
        "public, max-age={}, stale-while-revalidate={}",
        settings.rss.rss_edge_cache_seconds, settings.rss.rss_swr_seconds
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/rss+xml; charset=utf-8".to_string()),
            (header::CACHE_CONTROL, cache_control),
        ],
        body,
    )
        .into_response()
}
