//! print-server
//!
//! HTTP surface and pipeline orchestration: validate, template, render,
//! publish, respond, sweep.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod routes;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// All routes, wired to `state`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.body_limit;

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/v1/print/pdf", post(routes::print::print_pdf))
        .route("/v1/print/generate", get(routes::print::print_url))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
