use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::entities::line_type_components;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::services::drawing_type_service::LineTypeComponentView;
use crate::services::line_type_component_service::{
    LineTypeComponentUpdate, NewLineTypeComponent,
};
use crate::services::LineTypeComponentService;

pub async fn list_line_type_components(
    State(state): State<AppState>,
    Path(line_type_id): Path<i32>,
) -> ApiResult<Vec<LineTypeComponentView>> {
    let service = LineTypeComponentService::new(state.db.clone());
    Ok(Json(service.list(line_type_id).await?))
}

pub async fn create_line_type_component(
    State(state): State<AppState>,
    Path(line_type_id): Path<i32>,
    Json(payload): Json<NewLineTypeComponent>,
) -> Result<(StatusCode, Json<line_type_components::Model>), ApiError> {
    let service = LineTypeComponentService::new(state.db.clone());
    let entry = service.create(line_type_id, payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_line_type_component(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<LineTypeComponentUpdate>,
) -> ApiResult<line_type_components::Model> {
    let service = LineTypeComponentService::new(state.db.clone());
    Ok(Json(service.update(id, payload).await?))
}

pub async fn delete_line_type_component(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let service = LineTypeComponentService::new(state.db.clone());
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn duplicate_line_type_component(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<line_type_components::Model>), ApiError> {
    let service = LineTypeComponentService::new(state.db.clone());
    let copy = service.duplicate(id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}
