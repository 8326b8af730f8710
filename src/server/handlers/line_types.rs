use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::entities::line_types;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::services::line_type_service::{LineTypeUpdate, NewLineType};
use crate::services::LineTypeService;

pub async fn list_line_types(
    State(state): State<AppState>,
    Path(drawing_type_id): Path<i32>,
) -> ApiResult<Vec<line_types::Model>> {
    let service = LineTypeService::new(state.db.clone());
    Ok(Json(service.list(drawing_type_id).await?))
}

pub async fn create_line_type(
    State(state): State<AppState>,
    Path(drawing_type_id): Path<i32>,
    Json(payload): Json<NewLineType>,
) -> Result<(StatusCode, Json<line_types::Model>), ApiError> {
    let service = LineTypeService::new(state.db.clone());
    let line_type = service.create(drawing_type_id, payload).await?;
    Ok((StatusCode::CREATED, Json(line_type)))
}

pub async fn get_line_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<line_types::Model> {
    let service = LineTypeService::new(state.db.clone());
    Ok(Json(service.get(id).await?))
}

pub async fn update_line_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<LineTypeUpdate>,
) -> ApiResult<line_types::Model> {
    let service = LineTypeService::new(state.db.clone());
    Ok(Json(service.update(id, payload).await?))
}

pub async fn delete_line_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let service = LineTypeService::new(state.db.clone());
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn duplicate_line_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<line_types::Model>), ApiError> {
    let service = LineTypeService::new(state.db.clone());
    let copy = service.duplicate(id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}
