use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::entities::{component_versions, components, parts};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::services::component_service::{ComponentUpdate, NewComponent, NewPart};
use crate::services::component_version_service::{
    ImportedVersion, LabelImport, NewComponentVersion,
};
use crate::services::{ComponentService, ComponentVersionService, PartService};

pub async fn list_parts(State(state): State<AppState>) -> ApiResult<Vec<parts::Model>> {
    let service = PartService::new(state.db.clone());
    Ok(Json(service.list().await?))
}

pub async fn create_part(
    State(state): State<AppState>,
    Json(payload): Json<NewPart>,
) -> Result<(StatusCode, Json<parts::Model>), ApiError> {
    let service = PartService::new(state.db.clone());
    let part = service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(part)))
}

pub async fn delete_part(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let service = PartService::new(state.db.clone());
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_versions(
    State(state): State<AppState>,
) -> ApiResult<Vec<component_versions::Model>> {
    let service = ComponentVersionService::new(state.db.clone());
    Ok(Json(service.list().await?))
}

pub async fn create_version(
    State(state): State<AppState>,
    Json(payload): Json<NewComponentVersion>,
) -> Result<(StatusCode, Json<component_versions::Model>), ApiError> {
    let service = ComponentVersionService::new(state.db.clone());
    let version = service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(version)))
}

pub async fn import_version(
    State(state): State<AppState>,
    Json(payload): Json<LabelImport>,
) -> Result<(StatusCode, Json<ImportedVersion>), ApiError> {
    let service = ComponentVersionService::new(state.db.clone());
    let imported = service.import(payload).await?;
    Ok((StatusCode::CREATED, Json(imported)))
}

pub async fn selected_version(
    State(state): State<AppState>,
) -> ApiResult<Option<component_versions::Model>> {
    let service = ComponentVersionService::new(state.db.clone());
    Ok(Json(service.selected().await?))
}

pub async fn get_version(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<component_versions::Model> {
    let service = ComponentVersionService::new(state.db.clone());
    Ok(Json(service.get(id).await?))
}

pub async fn select_version(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<component_versions::Model> {
    let service = ComponentVersionService::new(state.db.clone());
    Ok(Json(service.select(id).await?))
}

pub async fn delete_version(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let service = ComponentVersionService::new(state.db.clone());
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_components(
    State(state): State<AppState>,
    Path(version_id): Path<i32>,
) -> ApiResult<Vec<components::Model>> {
    let service = ComponentService::new(state.db.clone());
    Ok(Json(service.list(version_id).await?))
}

pub async fn create_component(
    State(state): State<AppState>,
    Path(version_id): Path<i32>,
    Json(payload): Json<NewComponent>,
) -> Result<(StatusCode, Json<components::Model>), ApiError> {
    let service = ComponentService::new(state.db.clone());
    let component = service.create(version_id, payload).await?;
    Ok((StatusCode::CREATED, Json(component)))
}

pub async fn get_component(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<components::Model> {
    let service = ComponentService::new(state.db.clone());
    Ok(Json(service.get(id).await?))
}

pub async fn update_component(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ComponentUpdate>,
) -> ApiResult<components::Model> {
    let service = ComponentService::new(state.db.clone());
    Ok(Json(service.update(id, payload).await?))
}

pub async fn delete_component(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let service = ComponentService::new(state.db.clone());
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
