use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::services::reorder_service::{MoveOutcome, MoveRequest};
use crate::services::ReorderService;

pub async fn move_node(
    State(state): State<AppState>,
    Path(drawing_type_id): Path<i32>,
    Json(payload): Json<MoveRequest>,
) -> ApiResult<MoveOutcome> {
    let service = ReorderService::new(state.db.clone(), state.tree_locks.clone());
    Ok(Json(service.move_node(drawing_type_id, payload).await?))
}
