use crate::api::error::AppError;
use crate::services::scratch::ScratchDir;
use crate::services::stitch_service::Stage;
use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use std::io;
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};

pub const OUTPUT_FILE_NAME: &str = "output.mp4";
pub const SERVE_FILE_NAME: &str = "serve.mp4";
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";
pub const DOWNLOAD_FILE_NAME: &str = "stitched_video.mp4";

/// Check that the tool actually produced a plausible file and return its size
pub async fn validate_output(output: &Path, min_size: u64) -> Result<u64, AppError> {
    let size = match tokio::fs::metadata(output).await {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            error!("Output file not found at: {}", output.display());
            return Err(AppError::ProcessingFailure(
                "Failed to create output video file".to_string(),
            ));
        }
        Err(e) => {
            return Err(AppError::StorageFailure(format!(
                "Failed to read output video file: {}",
                e
            )));
        }
    };

    info!("Output file size: {} bytes", size);
    if size < min_size {
        error!("Output file too small: {} bytes", size);
        return Err(AppError::ProcessingFailure(
            "Output video file is too small, processing may have failed".to_string(),
        ));
    }

    Ok(size)
}

/// A validated result ready to be streamed back.
///
/// Owns the scratch directory; it is removed once the body stream ends
/// or is dropped by the server.
#[derive(Debug)]
pub struct StitchedVideo {
    scratch: ScratchDir,
    path: PathBuf,
    file: tokio::fs::File,
    size: u64,
}

impl StitchedVideo {
    /// Copy `output` to the serve path inside `scratch` and open the copy.
    /// The scratch directory is removed if either step fails.
    pub async fn prepare(scratch: ScratchDir, output: &Path) -> Result<Self, AppError> {
        let path = scratch.join(SERVE_FILE_NAME);
        let opened = async {
            let size = tokio::fs::copy(output, &path).await.map_err(|e| {
                AppError::StorageFailure(format!("Failed to create serve file: {}", e))
            })?;
            let file = tokio::fs::File::open(&path).await.map_err(|e| {
                AppError::StorageFailure(format!("Failed to open serve file: {}", e))
            })?;
            Ok::<_, AppError>((size, file))
        }
        .await;

        match opened {
            Ok((size, file)) => {
                info!("Created serve file with size {} bytes", size);
                Ok(Self {
                    scratch,
                    path,
                    file,
                    size,
                })
            }
            Err(e) => {
                scratch.remove().await;
                Err(e)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl IntoResponse for StitchedVideo {
    fn into_response(self) -> Response {
        let StitchedVideo {
            scratch,
            file,
            size,
            ..
        } = self;

        let stream = async_stream::stream! {
            // If the server drops the body early, the guard's drop removes the directory
            let mut chunks = ReaderStream::new(file);
            let mut sent: u64 = 0;
            while let Some(chunk) = chunks.next().await {
                match &chunk {
                    Ok(bytes) => sent += bytes.len() as u64,
                    Err(e) => warn!("Serve file read failed after {} bytes: {}", sent, e),
                }
                yield chunk;
            }
            info!(stage = %Stage::Delivered, "Delivered {} of {} bytes", sent, size);
            scratch.remove().await;
        };

        (
            [
                (header::CONTENT_TYPE, VIDEO_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
                ),
                (header::CONTENT_LENGTH, size.to_string()),
            ],
            Body::from_stream(stream),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_output() {
        let dir = TempDir::new().unwrap();
        let err = validate_output(&dir.path().join(OUTPUT_FILE_NAME), 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProcessingFailure(ref msg) if msg == "Failed to create output video file"));
    }

    #[tokio::test]
    async fn test_output_below_threshold() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join(OUTPUT_FILE_NAME);
        std::fs::write(&output, vec![0u8; 1023]).unwrap();

        let err = validate_output(&output, 1024).await.unwrap_err();
        assert!(matches!(err, AppError::ProcessingFailure(ref msg) if msg.contains("too small")));
    }

    #[tokio::test]
    async fn test_output_at_threshold() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join(OUTPUT_FILE_NAME);
        std::fs::write(&output, vec![0u8; 1024]).unwrap();

        assert_eq!(validate_output(&output, 1024).await.unwrap(), 1024);
    }

    #[tokio::test]
    async fn test_response_streams_copy_then_cleans_up() {
        let root = TempDir::new().unwrap();
        let scratch = ScratchDir::create_in(root.path()).unwrap();
        let scratch_path = scratch.path().to_path_buf();
        let output = scratch.join(OUTPUT_FILE_NAME);
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&output, &content).unwrap();

        let video = StitchedVideo::prepare(scratch, &output).await.unwrap();
        assert_eq!(video.size(), content.len() as u64);
        assert_eq!(video.path(), scratch_path.join(SERVE_FILE_NAME));
        assert_eq!(std::fs::read(video.path()).unwrap(), content);

        let response = video.into_response();
        assert!(scratch_path.exists());
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"stitched_video.mp4\""
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), content.as_slice());
        assert!(!scratch_path.exists());
    }

    #[tokio::test]
    async fn test_dropped_response_still_cleans_up() {
        let root = TempDir::new().unwrap();
        let scratch = ScratchDir::create_in(root.path()).unwrap();
        let scratch_path = scratch.path().to_path_buf();
        let output = scratch.join(OUTPUT_FILE_NAME);
        std::fs::write(&output, vec![7u8; 4096]).unwrap();

        let response = StitchedVideo::prepare(scratch, &output)
            .await
            .unwrap()
            .into_response();
        drop(response);

        for _ in 0..250 {
            if !scratch_path.exists() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("scratch directory survived the dropped response");
    }

    #[tokio::test]
    async fn test_failed_prepare_removes_scratch() {
        let root = TempDir::new().unwrap();
        let scratch = ScratchDir::create_in(root.path()).unwrap();
        let scratch_path = scratch.path().to_path_buf();

        let err = StitchedVideo::prepare(scratch, &scratch_path.join(OUTPUT_FILE_NAME))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageFailure(ref msg) if msg.contains("serve file")));
        assert!(!scratch_path.exists());
    }
}
