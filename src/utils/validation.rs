use anyhow::{Result, anyhow};

/// Fewest uploads a stitch request may carry
pub const MIN_FILES: usize = 2;

/// Most uploads a stitch request may carry
pub const MAX_FILES: usize = 5;

/// Extension every upload must end with (compared case-insensitively)
pub const REQUIRED_EXTENSION: &str = ".mp4";

/// Check the number of uploaded files
pub fn validate_file_count(count: usize) -> Result<()> {
    if !(MIN_FILES..=MAX_FILES).contains(&count) {
        return Err(anyhow!(
            "Please upload between {} and {} video files",
            MIN_FILES,
            MAX_FILES
        ));
    }
    Ok(())
}

/// Check that a client-supplied filename carries the required extension.
///
/// The name is used for nothing else; staged files get generated names.
pub fn validate_extension(filename: &str) -> Result<()> {
    if !filename.to_lowercase().ends_with(REQUIRED_EXTENSION) {
        return Err(anyhow!("Only MP4 files are allowed"));
    }
    Ok(())
}
