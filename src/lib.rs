//! Tumor-microenvironment risk assessment backend.
//!
//! Turns an 11-gene expression panel into a categorical risk assessment
//! with a narrative rationale, persisting every assessment as an immutable
//! report. The request pipeline is derive → score → explain → save, run
//! synchronously to completion inside each handler.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::model::TmePipeline;
use crate::store::ReportStore;

pub mod config;
pub mod error;
pub mod explanation;
pub mod features;
pub mod handlers;
pub mod model;
pub mod report;
pub mod scoring;
pub mod store;

/// Shared application state. The model handle is set once before serving
/// and never mutated, so concurrent readers need no synchronization; the
/// store is the only shared mutable resource.
#[derive(Clone)]
pub struct AppState {
    pub model: Option<Arc<TmePipeline>>,
    pub store: Arc<dyn ReportStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/reports", get(handlers::list_reports))
        .route("/reports/:analysis_id", get(handlers::get_report))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}
