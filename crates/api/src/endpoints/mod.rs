//! HTTP endpoints.

mod admin;
pub mod polls;

use axum::{Router, response::Redirect, routing::get};

use crate::state::AppState;

/// Create the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to(&polls::urls::index()) }))
        .route("/healthz", get(|| async { "ok" }))
        .merge(polls::router())
        .nest("/admin", admin::router())
}
