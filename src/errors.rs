use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("member not found")]
    MemberNotFound,
    #[error("missing name or group")]
    MissingNameOrGroup,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            AppError::InvalidMonth { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MemberNotFound => StatusCode::NOT_FOUND,
            AppError::MissingNameOrGroup => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let error_message = self.to_string();
        (status_code, error_message).into_response()
    }
}
