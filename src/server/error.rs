use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::errors::{CoreError, CoreErrorKind};

/// Error returned by every handler; renders `{ code, message, fields }`
#[derive(Debug)]
pub struct ApiError(pub CoreError);

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(self.0.kind())
    }
}

pub fn status_for(kind: CoreErrorKind) -> StatusCode {
    match kind {
        CoreErrorKind::NotFound => StatusCode::NOT_FOUND,
        CoreErrorKind::Validation => StatusCode::BAD_REQUEST,
        CoreErrorKind::Conflict => StatusCode::CONFLICT,
        CoreErrorKind::InvalidMove => StatusCode::UNPROCESSABLE_ENTITY,
        CoreErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        CoreErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.0;

        match err.kind() {
            CoreErrorKind::Internal => {
                let cause = std::error::Error::source(&err)
                    .map(|source| source.to_string())
                    .unwrap_or_default();
                error!("{} ({})", err, cause);
            }
            CoreErrorKind::InvalidMove | CoreErrorKind::Unavailable => warn!("{}", err),
            _ => {}
        }

        let body = json!({
            "code": err.kind().code(),
            "message": err.message(),
            "fields": err.fields(),
        });

        (status, Json(body)).into_response()
    }
}
