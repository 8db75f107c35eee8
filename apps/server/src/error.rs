use academy_core::errors::{DatabaseError, Error as CoreError};
use academy_core::fees::FeeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    if err.is_not_found() {
        return StatusCode::NOT_FOUND;
    }
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Fee(fee) => match fee {
            FeeError::InvalidPaymentAmount { .. }
            | FeeError::InvalidChallanAmount { .. }
            | FeeError::InvalidStatusAssignment(_) => StatusCode::BAD_REQUEST,
            FeeError::ChallanHasPayments { .. } | FeeError::ConcurrentModification { .. } => {
                StatusCode::CONFLICT
            }
            FeeError::NotFound { .. } => StatusCode::NOT_FOUND,
        },
        CoreError::Database(
            DatabaseError::UniqueViolation(_) | DatabaseError::ForeignKeyViolation(_),
        )
        | CoreError::ConstraintViolation(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Core(e) => core_status(e),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
