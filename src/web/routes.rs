use std::num::NonZeroU64;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use super::AppState;
use crate::rss::generate_rss;

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rss/4pda/:topic_id", get(topic_rss))
        .route("/healthz", get(health))
}

/// RSS feed of the latest messages of a forum thread.
async fn topic_rss(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let topic_id = match raw_id.parse::<NonZeroU64>() {
        Ok(id) => id.get(),
        Err(e) => {
            tracing::warn!(topic_id = %raw_id, "Invalid topic id: {e}");
            return (
                StatusCode::BAD_REQUEST,
                format!("invalid topic id '{raw_id}': {e}"),
            )
                .into_response();
        }
    };

    let feed = match state.provider.feed(topic_id).await {
        Ok(feed) => feed,
        Err(e) => {
            tracing::error!(topic_id, "Failed to download thread: {e}");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match generate_rss(&feed) {
        Ok(xml) => (
            [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
            xml,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(topic_id, "Failed to serialize feed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}
