use crate::api::error::AppError;
use crate::config::StitchConfig;
use crate::services::concat::Concatenator;
use crate::services::delivery::{OUTPUT_FILE_NAME, StitchedVideo, validate_output};
use crate::services::intake::{Upload, stage_uploads, validate_uploads};
use crate::services::manifest::write_manifest;
use crate::services::scratch::ScratchDir;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Lifecycle of a single stitch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Staged,
    ManifestWritten,
    Invoked,
    OutputValidated,
    Delivered,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::Staged => "staged",
            Stage::ManifestWritten => "manifest_written",
            Stage::Invoked => "invoked",
            Stage::OutputValidated => "output_validated",
            Stage::Delivered => "delivered",
        };
        f.write_str(name)
    }
}

pub struct StitchService {
    concatenator: Arc<dyn Concatenator>,
    config: StitchConfig,
}

impl StitchService {
    pub fn new(concatenator: Arc<dyn Concatenator>, config: StitchConfig) -> Self {
        Self {
            concatenator,
            config,
        }
    }

    /// Run the whole pipeline. On error the scratch directory is removed
    /// before returning; on success it travels with the returned video.
    pub async fn stitch(&self, uploads: Vec<Upload>) -> Result<StitchedVideo, AppError> {
        let mut stage = Stage::Received;
        info!(stage = %stage, files = uploads.len(), "Stitch request received");

        validate_uploads(&uploads).inspect_err(|e| {
            error!(stage = %stage, kind = e.kind(), "Stitch failed: {}", e);
        })?;
        stage = Stage::Validated;

        let scratch = ScratchDir::create_in(&self.config.scratch_root).map_err(|e| {
            AppError::StorageFailure(format!("Failed to create scratch directory: {}", e))
        })?;
        info!("Created temporary directory: {}", scratch.path().display());

        match self.run(&scratch, uploads, &mut stage).await {
            Ok(output) => {
                let video = StitchedVideo::prepare(scratch, &output).await.inspect_err(|e| {
                    error!(stage = %stage, kind = e.kind(), "Stitch failed: {}", e);
                })?;
                info!(
                    bytes = video.size(),
                    "Streaming stitched video from {}",
                    video.path().display()
                );
                Ok(video)
            }
            Err(e) => {
                error!(stage = %stage, kind = e.kind(), "Stitch failed: {}", e);
                scratch.remove().await;
                Err(e)
            }
        }
    }

    // `stage` tracks the last stage reached so failures can be attributed
    async fn run(
        &self,
        scratch: &ScratchDir,
        uploads: Vec<Upload>,
        stage: &mut Stage,
    ) -> Result<PathBuf, AppError> {
        let staged = stage_uploads(scratch, uploads).await?;
        *stage = Stage::Staged;
        for input in &staged {
            debug!(id = %input.id, bytes = input.size, "Staged {}", input.original_name);
        }
        let total: u64 = staged.iter().map(|s| s.size).sum();
        info!(stage = %stage, files = staged.len(), bytes = total, "Uploads staged");

        let inputs: Vec<PathBuf> = staged.into_iter().map(|s| s.path).collect();
        let manifest = write_manifest(scratch.path(), inputs.as_slice()).await?;
        *stage = Stage::ManifestWritten;
        info!(stage = %stage, "Manifest written to {}", manifest.display());

        let output = scratch.join(OUTPUT_FILE_NAME);
        self.concatenator.concat(&manifest, &output).await?;
        *stage = Stage::Invoked;
        info!(stage = %stage, "Concatenation finished");

        validate_output(&output, self.config.min_output_size).await?;
        *stage = Stage::OutputValidated;
        info!(stage = %stage, "Output validated");

        Ok(output)
    }
}
