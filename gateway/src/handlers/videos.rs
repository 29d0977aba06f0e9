use axum::{
    Extension, Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::io::SeekFrom;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::auth::Auth;
use crate::core::video::{RangeRequest, VideoStore, video_content_type};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_name: String,
    pub size: u64,
}

fn video_store(state: &AppState) -> AppResult<&VideoStore> {
    state.video_store.as_ref().ok_or_else(|| {
        tracing::error!("Video request received but storage is not configured");
        AppError::ServiceUnavailable("Video storage not configured".to_string())
    })
}

fn header_value(value: String) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|e| AppError::Internal(e.to_string()))
}

/// Store a recorded video under the given file name
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let store = video_store(&state)?;
    video_content_type(&file_name)?;

    // Reject early when the client announces an oversized body
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > store.max_upload_bytes()) {
        tracing::warn!(file_name = %file_name, declared = ?declared, "Video upload exceeds limit");
        return Err(AppError::PayloadTooLarge(format!(
            "Video exceeds the maximum upload size of {} bytes",
            store.max_upload_bytes()
        )));
    }

    let size = store.save(&file_name, body.into_data_stream()).await?;
    tracing::info!(file_name = %file_name, size, auth_id = ?auth.id, "Video uploaded");

    Ok((StatusCode::CREATED, Json(UploadResponse { file_name, size })))
}

/// Serve a stored video, honouring single `Range: bytes=` requests
pub async fn download_video(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let store = video_store(&state)?;
    let content_type = video_content_type(&file_name)?;
    let (mut file, len) = store.open(&file_name).await?;

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let response = match RangeRequest::parse(range, len) {
        RangeRequest::Full => {
            tracing::debug!(file_name = %file_name, bytes = len, "Serving full video");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
                    (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
                    (header::CONTENT_LENGTH, HeaderValue::from(len)),
                ],
                Body::from_stream(ReaderStream::new(file)),
            )
                .into_response()
        }
        RangeRequest::Partial { start, end } => {
            let chunk_len = end - start + 1;
            file.seek(SeekFrom::Start(start))
                .await
                .map_err(crate::core::video::VideoError::from)?;
            tracing::debug!(file_name = %file_name, start, end, "Serving video range");
            (
                StatusCode::PARTIAL_CONTENT,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
                    (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
                    (header::CONTENT_LENGTH, HeaderValue::from(chunk_len)),
                    (
                        header::CONTENT_RANGE,
                        header_value(format!("bytes {start}-{end}/{len}"))?,
                    ),
                ],
                Body::from_stream(ReaderStream::new(file.take(chunk_len))),
            )
                .into_response()
        }
        RangeRequest::Unsatisfiable => {
            tracing::debug!(file_name = %file_name, range = ?range, "Unsatisfiable range");
            (
                StatusCode::RANGE_NOT_SATISFIABLE,
                [
                    (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
                    (header::CONTENT_RANGE, header_value(format!("bytes */{len}"))?),
                ],
            )
                .into_response()
        }
    };

    Ok(response)
}
