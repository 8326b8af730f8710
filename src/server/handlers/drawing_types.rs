use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::database::entities::drawing_types;
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::services::drawing_type_service::{DrawingTypeTree, DrawingTypeUpdate, NewDrawingType};
use crate::services::DrawingTypeService;

pub async fn list_drawing_types(
    State(state): State<AppState>,
) -> ApiResult<Vec<drawing_types::Model>> {
    let service = DrawingTypeService::new(state.db.clone());
    Ok(Json(service.list().await?))
}

pub async fn create_drawing_type(
    State(state): State<AppState>,
    Json(payload): Json<NewDrawingType>,
) -> Result<(StatusCode, Json<drawing_types::Model>), ApiError> {
    let service = DrawingTypeService::new(state.db.clone());
    let drawing_type = service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(drawing_type)))
}

pub async fn get_drawing_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<drawing_types::Model> {
    let service = DrawingTypeService::new(state.db.clone());
    Ok(Json(service.get(id).await?))
}

pub async fn update_drawing_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<DrawingTypeUpdate>,
) -> ApiResult<drawing_types::Model> {
    let service = DrawingTypeService::new(state.db.clone());
    Ok(Json(service.update(id, payload).await?))
}

pub async fn delete_drawing_type(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let service = DrawingTypeService::new(state.db.clone());
    service.delete(id).await?;
    state.tree_locks.forget(id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_tree(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<DrawingTypeTree> {
    let service = DrawingTypeService::new(state.db.clone());
    Ok(Json(service.tree(id).await?))
}
