use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub mod ai;
pub mod config;
pub mod datasets;
pub mod error;
pub mod pages;
pub mod routes;
pub mod storage;

use ai::{GeminiConfig, VisualQueryGateway};
use config::{ComparisonPairs, Config};
use datasets::DatasetLister;
use storage::AnnotationStore;

#[derive(Clone)]
pub struct AppState {
    pub datasets: DatasetLister,
    pub annotations: AnnotationStore,
    /// `None` when no API key is configured; the ask endpoint then reports 503.
    pub gateway: Option<VisualQueryGateway>,
    pub pairs: Arc<ComparisonPairs>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        let gateway = config
            .gemini_api_key
            .as_ref()
            .filter(|key| !key.trim().is_empty())
            .map(|key| {
                VisualQueryGateway::new(GeminiConfig {
                    api_key: key.trim().to_string(),
                    model: config.gemini_model.clone(),
                    base_url: config.gemini_base_url.clone(),
                })
            });

        Self {
            datasets: DatasetLister::new(&config.tiles_root, &config.manifest_name),
            annotations: AnnotationStore::new(&config.annotations_dir),
            gateway,
            pairs: Arc::new(ComparisonPairs::from_pairs(config.pairs.clone())),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let tiles = ServeDir::new(state.datasets.root());

    Router::new()
        .route("/", get(routes::gallery))
        .route("/viewer/{name}", get(routes::viewer))
        .route("/compare/{left}/{right}", get(routes::compare))
        .route(
            "/annotations/{name}",
            get(routes::get_annotations).post(routes::add_annotation),
        )
        .route("/ask/{name}", post(routes::ask))
        .route("/query_visual_rag", post(routes::query_visual_rag))
        .route("/api/health", get(routes::health))
        .nest_service("/static/tiles", tiles)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
