// Route table for the Verdict API
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/signature/detect", post(handlers::detect_signature))
        .route("/starter", post(handlers::starter_code))
        .route("/starter/all", post(handlers::all_starter_code))
        .route("/run", post(handlers::run_test_cases))
        .route("/score", post(handlers::score))
        .route("/submit", post(handlers::submit))
}
