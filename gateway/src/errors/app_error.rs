use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::core::tts::TTSError;
use crate::core::video::VideoError;

/// Application level error returned by HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    BadGateway(String),

    /// Synthesis failures are reported with the `{ success, error }` envelope
    #[error(transparent)]
    Synthesis(#[from] TTSError),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Synthesis(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VideoError> for AppError {
    fn from(err: VideoError) -> Self {
        match err {
            VideoError::InvalidFileName(_) | VideoError::UnsupportedType(_) => {
                AppError::BadRequest(err.to_string())
            }
            VideoError::NotFound(_) => AppError::NotFound(err.to_string()),
            VideoError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            VideoError::Io(e) => {
                tracing::error!(error = %e, "Video storage I/O failure");
                AppError::Internal("Video storage failure".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AppError::Synthesis(err) => (
                status,
                Json(json!({ "success": false, "error": err.client_message() })),
            )
                .into_response(),
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}
