use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Operational configuration for the stitch endpoint
#[derive(Debug, Clone)]
pub struct StitchConfig {
    /// Maximum multipart request body in bytes (default: 512 MB)
    pub max_request_size: usize,

    /// Path or name of the ffmpeg binary (default: "ffmpeg")
    pub ffmpeg_path: String,

    /// Wall clock limit for a single ffmpeg run in seconds (default: 300)
    pub ffmpeg_timeout_secs: u64,

    /// Outputs smaller than this are treated as failed runs (default: 1 KB)
    pub min_output_size: u64,

    /// Parent directory for per-request scratch directories (default: system temp)
    pub scratch_root: PathBuf,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            max_request_size: 512 * 1024 * 1024, // 512 MB
            ffmpeg_path: "ffmpeg".to_string(),
            ffmpeg_timeout_secs: 300,
            min_output_size: 1024,
            scratch_root: env::temp_dir(),
        }
    }
}

impl StitchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_request_size: env::var("MAX_REQUEST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_request_size),

            ffmpeg_path: env::var("FFMPEG_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default.ffmpeg_path),

            ffmpeg_timeout_secs: env::var("FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(default.ffmpeg_timeout_secs),

            min_output_size: env::var("MIN_OUTPUT_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.min_output_size),

            scratch_root: env::var("SCRATCH_ROOT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.scratch_root),
        }
    }

    /// Create config for development (short timeout, small body limit)
    pub fn development() -> Self {
        Self {
            max_request_size: 64 * 1024 * 1024,
            ffmpeg_timeout_secs: 60,
            ..Self::default()
        }
    }

    pub fn ffmpeg_timeout(&self) -> Duration {
        Duration::from_secs(self.ffmpeg_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StitchConfig::default();
        assert_eq!(config.max_request_size, 512 * 1024 * 1024);
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.min_output_size, 1024);
        assert_eq!(config.scratch_root, env::temp_dir());
    }

    #[test]
    fn test_development_config() {
        let config = StitchConfig::development();
        assert_eq!(config.max_request_size, 64 * 1024 * 1024);
        assert_eq!(config.ffmpeg_timeout(), Duration::from_secs(60));
        assert_eq!(config.min_output_size, 1024);
    }
}
