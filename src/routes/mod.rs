use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Catalogue;
use crate::middleware::{make_span_with_request_id, request_id_middleware};
use crate::services::prose::ProseGenerator;

pub mod analyze;

/// Default bound on a prose generation call
pub const DEFAULT_PROSE_TIMEOUT: Duration = Duration::from_millis(4000);

/// Shared, read-only application state
pub struct AppState {
    pub catalogue: Arc<Catalogue>,
    /// `None` means template prose only
    pub prose: Option<Arc<dyn ProseGenerator>>,
    pub prose_timeout: Duration,
}

impl AppState {
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            catalogue: Arc::new(catalogue),
            prose: None,
            prose_timeout: DEFAULT_PROSE_TIMEOUT,
        }
    }

    pub fn with_prose(mut self, generator: Arc<dyn ProseGenerator>, timeout: Duration) -> Self {
        self.prose = Some(generator);
        self.prose_timeout = timeout;
        self
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze::analyze))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(Arc::new(state))
}

/// Liveness plus catalogue status
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "catalogueSize": state.catalogue.len(),
            "catalogueLoadedAt": state.catalogue.loaded_at().to_rfc3339(),
        })),
    )
}
