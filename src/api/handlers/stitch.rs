use crate::api::error::AppError;
use crate::services::delivery::StitchedVideo;
use crate::services::intake::Upload;
use crate::utils::validation::{MAX_FILES, MIN_FILES};
use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};

/// Multipart field carrying the videos, repeated once per file
pub const FILES_FIELD: &str = "files";

#[utoipa::path(
    post,
    path = "/stitch",
    request_body(content = Multipart, description = "2 to 5 MP4 files under the `files` field, in playback order"),
    responses(
        (status = 200, description = "Stitched video streamed as video/mp4"),
        (status = 400, description = "Wrong file count or non-MP4 upload"),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "Storage or ffmpeg failure")
    ),
    tag = "stitch"
)]
pub async fn stitch_videos(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<StitchedVideo, AppError> {
    let uploads = match collect_uploads(&mut multipart).await {
        Ok(uploads) => uploads,
        Err(e) => {
            // Drain the rest so the client sees our error instead of a connection reset
            tracing::warn!("Upload failed early: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            return Err(e);
        }
    };

    state.stitcher.stitch(uploads).await
}

async fn collect_uploads(multipart: &mut Multipart) -> Result<Vec<Upload>, AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if uploads.len() == MAX_FILES {
            // No point buffering a sixth video only to reject it
            return Err(AppError::InvalidRequest(format!(
                "Please upload between {} and {} video files",
                MIN_FILES, MAX_FILES
            )));
        }

        let data = field.bytes().await.map_err(multipart_error)?;
        tracing::info!("Read {} bytes from uploaded file {}", data.len(), filename);
        uploads.push(Upload::new(filename, data));
    }

    Ok(uploads)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::InvalidRequest(e.body_text())
    }
}
