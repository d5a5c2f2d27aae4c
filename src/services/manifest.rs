use crate::api::error::AppError;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "list.txt";

/// Render the concat demuxer script: one `file '<path>'` line per input, in order.
pub fn render_manifest<P: AsRef<Path>>(paths: &[P]) -> String {
    paths
        .iter()
        .map(|p| format!("file '{}'\n", quote_path(p.as_ref())))
        .collect()
}

// The demuxer closes the quoted string, takes an escaped quote, then reopens.
fn quote_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

/// Write the manifest into `dir` and return its path
pub async fn write_manifest<P: AsRef<Path>>(dir: &Path, paths: &[P]) -> Result<PathBuf, AppError> {
    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    tracing::info!("Creating list file at: {}", manifest_path.display());

    tokio::fs::write(&manifest_path, render_manifest(paths))
        .await
        .map_err(|e| AppError::StorageFailure(format!("Failed to write manifest: {}", e)))?;

    Ok(manifest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_one_line_per_input_in_order() {
        let paths = ["/tmp/s/b.mp4", "/tmp/s/a.mp4", "/tmp/s/c.mp4"];
        assert_eq!(
            render_manifest(&paths),
            "file '/tmp/s/b.mp4'\nfile '/tmp/s/a.mp4'\nfile '/tmp/s/c.mp4'\n"
        );
    }

    #[test]
    fn test_single_quotes_are_escaped() {
        let paths = ["/tmp/it's/a.mp4"];
        assert_eq!(render_manifest(&paths), "file '/tmp/it'\\''s/a.mp4'\n");
    }

    #[tokio::test]
    async fn test_write_manifest() {
        let dir = TempDir::new().unwrap();
        let inputs = [dir.path().join("1.mp4"), dir.path().join("2.mp4")];

        let manifest = write_manifest(dir.path(), &inputs).await.unwrap();

        assert_eq!(manifest, dir.path().join("list.txt"));
        let content = std::fs::read_to_string(&manifest).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("file '{}'", inputs[0].display()));
        assert_eq!(lines[1], format!("file '{}'", inputs[1].display()));
    }

    #[tokio::test]
    async fn test_write_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");

        let err = write_manifest(&missing, &["/x.mp4"]).await.unwrap_err();
        assert!(matches!(err, AppError::StorageFailure(_)));
    }
}
