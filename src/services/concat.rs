use crate::api::error::AppError;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Upper bound for the `-version` availability check
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Joins the inputs listed in a manifest into a single output file
#[async_trait::async_trait]
pub trait Concatenator: Send + Sync {
    /// Run the concatenation. Success only means the tool reported success;
    /// the produced file is not inspected.
    async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), AppError>;

    /// Check if the underlying tool is available
    async fn health_check(&self) -> bool;
}

/// Stream-copy concatenation through the ffmpeg concat demuxer
pub struct FfmpegConcatenator {
    binary: String,
    timeout: Duration,
}

impl FfmpegConcatenator {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// `-f concat -safe 0 -i <manifest> -c copy <output>`
    pub fn build_args(manifest: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            manifest.as_os_str().to_owned(),
            "-c".into(),
            "copy".into(),
            output.as_os_str().to_owned(),
        ]
    }
}

#[async_trait::async_trait]
impl Concatenator for FfmpegConcatenator {
    async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), AppError> {
        let args = Self::build_args(manifest, output);
        info!(
            "FFmpeg command: {} {}",
            self.binary,
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        // kill_on_drop: an abandoned request must not leave ffmpeg running
        let mut command = Command::new(&self.binary);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                error!("FFmpeg timed out after {:?}", self.timeout);
                AppError::ProcessingFailure(format!(
                    "FFmpeg processing timed out after {} seconds",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                error!("Failed to start {}: {}", self.binary, e);
                AppError::ProcessingFailure(format!(
                    "FFmpeg processing failed: could not start {}: {}",
                    self.binary, e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&result.stdout);
        let stderr = String::from_utf8_lossy(&result.stderr);

        if !result.status.success() {
            error!("FFmpeg error ({}): {}", result.status, stderr);
            return Err(AppError::ProcessingFailure(format!(
                "FFmpeg processing failed: {}",
                stderr
            )));
        }

        debug!("FFmpeg stdout: {}", stdout);
        debug!("FFmpeg stderr: {}", stderr);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut command = Command::new(&self.binary);
        command
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let limit = self.timeout.min(PROBE_TIMEOUT);
        match tokio::time::timeout(limit, command.status()).await {
            Ok(status) => status.map(|s| s.success()).unwrap_or(false),
            Err(_) => {
                warn!("{} -version did not finish within {:?}", self.binary, limit);
                false
            }
        }
    }
}
