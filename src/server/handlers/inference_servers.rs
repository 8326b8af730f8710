use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::entities::inference_servers;
use crate::inference::HealthStatus;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::services::inference_server_service::NewInferenceServer;
use crate::services::InferenceServerService;

fn service(state: &AppState) -> InferenceServerService {
    InferenceServerService::new(state.db.clone(), state.inference.clone())
}

pub async fn list_servers(
    State(state): State<AppState>,
) -> ApiResult<Vec<inference_servers::Model>> {
    Ok(Json(service(&state).list().await?))
}

pub async fn create_server(
    State(state): State<AppState>,
    Json(payload): Json<NewInferenceServer>,
) -> Result<(StatusCode, Json<inference_servers::Model>), ApiError> {
    let server = service(&state).create(payload).await?;
    Ok((StatusCode::CREATED, Json(server)))
}

pub async fn get_server(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<inference_servers::Model> {
    Ok(Json(service(&state).get(id).await?))
}

pub async fn selected_server(
    State(state): State<AppState>,
) -> ApiResult<Option<inference_servers::Model>> {
    Ok(Json(service(&state).selected().await?))
}

pub async fn select_server(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<inference_servers::Model> {
    Ok(Json(service(&state).select(id).await?))
}

pub async fn delete_server(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Degraded status is a normal answer here, not an error
pub async fn server_health(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<HealthStatus> {
    Ok(Json(service(&state).health(id).await?))
}
