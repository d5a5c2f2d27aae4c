use crate::config::StitchConfig;
use crate::services::concat::{Concatenator, FfmpegConcatenator};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn setup_concatenator(config: &StitchConfig) -> Arc<dyn Concatenator> {
    let concatenator = FfmpegConcatenator::new(config.ffmpeg_path.clone(), config.ffmpeg_timeout());

    if concatenator.health_check().await {
        info!("🎬 ffmpeg available at '{}'", config.ffmpeg_path);
    } else {
        warn!(
            "⚠️  ffmpeg not runnable at '{}'! Stitch requests will fail until it is installed.",
            config.ffmpeg_path
        );
    }

    Arc::new(concatenator)
}
