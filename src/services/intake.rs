use crate::api::error::AppError;
use crate::services::scratch::ScratchDir;
use crate::utils::validation::{REQUIRED_EXTENSION, validate_extension, validate_file_count};
use bytes::Bytes;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

/// One file part received from the client, fully buffered
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// An upload persisted to the scratch directory under a generated name
#[derive(Debug, Clone)]
pub struct StagedInput {
    pub id: Uuid,
    pub original_name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Check the file count and every filename before anything touches disk
pub fn validate_uploads(uploads: &[Upload]) -> Result<(), AppError> {
    validate_file_count(uploads.len()).map_err(|e| AppError::InvalidRequest(e.to_string()))?;
    for upload in uploads {
        validate_extension(&upload.filename)
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;
    }
    Ok(())
}

/// Write each upload into `scratch`, preserving upload order.
///
/// Expects uploads already accepted by [`validate_uploads`].
pub async fn stage_uploads(
    scratch: &ScratchDir,
    uploads: Vec<Upload>,
) -> Result<Vec<StagedInput>, AppError> {
    let mut staged = Vec::with_capacity(uploads.len());
    for upload in uploads {
        staged.push(stage_one(scratch, upload).await?);
    }
    Ok(staged)
}

async fn stage_one(scratch: &ScratchDir, upload: Upload) -> Result<StagedInput, AppError> {
    let id = Uuid::new_v4();
    let path = scratch.join(format!("{}{}", id, REQUIRED_EXTENSION));
    info!(
        "Saving {} ({} bytes) to {}",
        upload.filename,
        upload.data.len(),
        path.display()
    );

    tokio::fs::write(&path, &upload.data).await.map_err(|e| {
        AppError::StorageFailure(format!("Failed to save file {}: {}", upload.filename, e))
    })?;

    // Read back what landed on disk rather than trusting the write
    let size = tokio::fs::metadata(&path)
        .await
        .map(|m| m.len())
        .map_err(|e| {
            AppError::StorageFailure(format!("Failed to save file {}: {}", upload.filename, e))
        })?;

    Ok(StagedInput {
        id,
        original_name: upload.filename,
        path,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn uploads(names: &[&str]) -> Vec<Upload> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Upload::new(*name, vec![i as u8; 16 * (i + 1)]))
            .collect()
    }

    #[tokio::test]
    async fn test_stages_in_upload_order() {
        let root = TempDir::new().unwrap();
        let scratch = ScratchDir::create_in(root.path()).unwrap();

        let staged = stage_uploads(&scratch, uploads(&["b.mp4", "a.MP4", "c.mp4"]))
            .await
            .unwrap();

        assert_eq!(staged.len(), 3);
        let names: Vec<_> = staged.iter().map(|s| s.original_name.as_str()).collect();
        assert_eq!(names, ["b.mp4", "a.MP4", "c.mp4"]);
        for (i, input) in staged.iter().enumerate() {
            assert!(input.path.starts_with(scratch.path()));
            assert_eq!(input.size, 16 * (i as u64 + 1));
            assert_eq!(std::fs::read(&input.path).unwrap(), vec![i as u8; 16 * (i + 1)]);
        }
    }

    #[tokio::test]
    async fn test_storage_names_ignore_client_names() {
        let root = TempDir::new().unwrap();
        let scratch = ScratchDir::create_in(root.path()).unwrap();

        let staged = stage_uploads(&scratch, uploads(&["../../etc/passwd.mp4", "x.mp4"]))
            .await
            .unwrap();

        for input in &staged {
            assert_eq!(input.path.parent().unwrap(), scratch.path());
            assert_eq!(
                input.path.file_name().unwrap().to_string_lossy(),
                format!("{}.mp4", input.id)
            );
        }
    }

    #[test]
    fn test_rejects_bad_counts() {
        for names in [
            vec![],
            vec!["a.mp4"],
            vec!["a.mp4", "b.mp4", "c.mp4", "d.mp4", "e.mp4", "f.mp4"],
        ] {
            let err = validate_uploads(&uploads(&names)).unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }
        assert!(validate_uploads(&uploads(&["a.mp4", "b.mp4"])).is_ok());
    }

    #[test]
    fn test_rejects_wrong_extension_anywhere() {
        for names in [["a.mp4", "b.avi"], ["a.mkv", "b.mp4"]] {
            let err = validate_uploads(&uploads(&names)).unwrap_err();
            assert!(
                matches!(err, AppError::InvalidRequest(ref msg) if msg == "Only MP4 files are allowed")
            );
        }
    }

    #[tokio::test]
    async fn test_unwritable_scratch_is_storage_failure() {
        let root = TempDir::new().unwrap();
        let scratch = ScratchDir::create_in(root.path()).unwrap();
        std::fs::remove_dir_all(scratch.path()).unwrap();

        let err = stage_uploads(&scratch, uploads(&["a.mp4", "b.mp4"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageFailure(_)));
    }
}
