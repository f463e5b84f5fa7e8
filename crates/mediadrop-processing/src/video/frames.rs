//! Still-frame extraction through an external `ffmpeg` binary.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

const FRAME_PREFIX: &str = "frame_";
const FRAME_PATTERN: &str = "frame_%03d.jpg";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame count must be between 1 and {max}, got {count}")]
    InvalidCount { count: u32, max: u32 },

    #[error("Frame interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),

    #[error("Frame width must be non-zero")]
    InvalidWidth,

    #[error("Failed to start ffmpeg at '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("FFmpeg failed: {0}")]
    Ffmpeg(String),

    #[error("FFmpeg did not finish within {0:?}")]
    Timeout(Duration),

    #[error("No frames could be extracted from the video")]
    NoFrames,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How many frames to pull and how far apart.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOptions {
    pub count: u32,
    pub interval_secs: f64,
    /// Output width; height follows the aspect ratio.
    pub width: Option<u32>,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            count: 5,
            interval_secs: 1.0,
            width: None,
        }
    }
}

impl FrameOptions {
    pub fn validate(&self, max_frames: u32) -> Result<(), FrameError> {
        if self.count == 0 || self.count > max_frames {
            return Err(FrameError::InvalidCount {
                count: self.count,
                max: max_frames,
            });
        }
        if !self.interval_secs.is_finite() || self.interval_secs <= 0.0 {
            return Err(FrameError::InvalidInterval(self.interval_secs));
        }
        if self.width == Some(0) {
            return Err(FrameError::InvalidWidth);
        }
        Ok(())
    }

    fn filter(&self) -> String {
        let mut filter = format!("fps=1/{}", self.interval_secs);
        if let Some(width) = self.width {
            filter.push_str(&format!(",scale={}:-1", width));
        }
        filter
    }
}

pub struct FrameExtractor {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FrameExtractor {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    /// Arguments passed to ffmpeg for one extraction run.
    pub fn build_args(input: &Path, output_dir: &Path, options: &FrameOptions) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vf".to_string(),
            options.filter(),
            "-frames:v".to_string(),
            options.count.to_string(),
            "-q:v".to_string(),
            "2".to_string(),
            output_dir.join(FRAME_PATTERN).to_string_lossy().to_string(),
        ]
    }

    /// Extract up to `options.count` JPEG frames from `input`, in playback order.
    ///
    /// Intermediate files live in a temporary directory that is removed before
    /// this returns, whether or not extraction succeeded.
    #[tracing::instrument(skip(self, options), fields(count = options.count, interval = options.interval_secs))]
    pub async fn extract_frames(
        &self,
        input: &Path,
        options: &FrameOptions,
    ) -> Result<Vec<Vec<u8>>, FrameError> {
        let work_dir = tempfile::Builder::new()
            .prefix("mediadrop-frames-")
            .tempdir()?;
        let args = Self::build_args(input, work_dir.path(), options);

        let start = std::time::Instant::now();
        let child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| FrameError::Timeout(self.timeout))?
            .map_err(|source| FrameError::Spawn {
                path: self.ffmpeg_path.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FrameError::Ffmpeg(stderr.trim().to_string()));
        }

        let paths = collect_frame_paths(work_dir.path()).await?;
        if paths.is_empty() {
            return Err(FrameError::NoFrames);
        }

        let mut frames = Vec::with_capacity(paths.len());
        for path in paths.iter().take(options.count as usize) {
            frames.push(tokio::fs::read(path).await?);
        }

        tracing::info!(
            frames = frames.len(),
            total_bytes = frames.iter().map(Vec::len).sum::<usize>(),
            duration_ms = start.elapsed().as_millis(),
            "Frames extracted"
        );

        Ok(frames)
    }
}

async fn collect_frame_paths(dir: &Path) -> Result<Vec<PathBuf>, FrameError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(FRAME_PREFIX) && name.ends_with(".jpg") {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}
