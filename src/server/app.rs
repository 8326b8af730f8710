use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    catalog, drawing_types, health, inference_servers, line_type_components, line_types, tree,
};
use crate::inference::InferenceClient;
use crate::services::TreeLocks;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tree_locks: Arc<TreeLocks>,
    pub inference: InferenceClient,
}

impl AppState {
    pub fn new(db: DatabaseConnection, inference: InferenceClient) -> Self {
        Self {
            db,
            tree_locks: Arc::new(TreeLocks::new()),
            inference,
        }
    }
}

pub async fn create_app(db: DatabaseConnection, cors_origin: Option<&str>) -> Result<Router> {
    create_app_with_state(AppState::new(db, InferenceClient::default()), cors_origin)
}

pub fn create_app_with_state(state: AppState, cors_origin: Option<&str>) -> Result<Router> {
    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<axum::http::HeaderValue>()
                    .map_err(|e| anyhow!("Invalid CORS origin: {}", e))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        // Drawing types and their trees
        .route(
            "/drawing-types",
            get(drawing_types::list_drawing_types).post(drawing_types::create_drawing_type),
        )
        .route(
            "/drawing-types/:id",
            get(drawing_types::get_drawing_type)
                .put(drawing_types::update_drawing_type)
                .delete(drawing_types::delete_drawing_type),
        )
        .route("/drawing-types/:id/tree", get(drawing_types::get_tree))
        .route("/drawing-types/:id/tree/move", post(tree::move_node))
        // Line types
        .route(
            "/drawing-types/:id/line-types",
            get(line_types::list_line_types).post(line_types::create_line_type),
        )
        .route(
            "/line-types/:id",
            get(line_types::get_line_type)
                .put(line_types::update_line_type)
                .delete(line_types::delete_line_type),
        )
        .route(
            "/line-types/:id/duplicate",
            post(line_types::duplicate_line_type),
        )
        // Line type components
        .route(
            "/line-types/:id/components",
            get(line_type_components::list_line_type_components)
                .post(line_type_components::create_line_type_component),
        )
        .route(
            "/line-type-components/:id",
            put(line_type_components::update_line_type_component)
                .delete(line_type_components::delete_line_type_component),
        )
        .route(
            "/line-type-components/:id/duplicate",
            post(line_type_components::duplicate_line_type_component),
        )
        // Component catalog
        .route("/parts", get(catalog::list_parts).post(catalog::create_part))
        .route("/parts/:id", delete(catalog::delete_part))
        .route(
            "/component-versions",
            get(catalog::list_versions).post(catalog::create_version),
        )
        .route("/component-versions/import", post(catalog::import_version))
        .route(
            "/component-versions/selected",
            get(catalog::selected_version),
        )
        .route(
            "/component-versions/:id",
            get(catalog::get_version).delete(catalog::delete_version),
        )
        .route(
            "/component-versions/:id/select",
            post(catalog::select_version),
        )
        .route(
            "/component-versions/:id/components",
            get(catalog::list_components).post(catalog::create_component),
        )
        .route(
            "/components/:id",
            get(catalog::get_component)
                .put(catalog::update_component)
                .delete(catalog::delete_component),
        )
        // Inference servers
        .route(
            "/inference-servers",
            get(inference_servers::list_servers).post(inference_servers::create_server),
        )
        .route(
            "/inference-servers/selected",
            get(inference_servers::selected_server),
        )
        .route(
            "/inference-servers/:id",
            get(inference_servers::get_server).delete(inference_servers::delete_server),
        )
        .route(
            "/inference-servers/:id/select",
            post(inference_servers::select_server),
        )
        .route(
            "/inference-servers/:id/health",
            get(inference_servers::server_health),
        )
}
