//! Application state shared by all handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mediadrop_core::Config;
use mediadrop_processing::{FrameExtractor, MediaKind, MediaValidator};
use mediadrop_storage::MediaHost;

use crate::constants::FRAME_EXTRACTION_MARGIN_SECS;

/// Upload destination and the validators applied before a file reaches it.
#[derive(Clone)]
pub struct MediaState {
    pub host: Arc<dyn MediaHost>,
    pub image_validator: MediaValidator,
    pub video_validator: MediaValidator,
    /// Where incoming uploads are spooled; `None` means the system temp dir.
    pub upload_tmp_dir: Option<PathBuf>,
}

impl MediaState {
    pub fn validator_for(&self, kind: MediaKind) -> &MediaValidator {
        match kind {
            MediaKind::Image => &self.image_validator,
            MediaKind::Video => &self.video_validator,
        }
    }
}

/// Canvas limits for the draw endpoints.
#[derive(Debug, Clone, Copy)]
pub struct DrawState {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

/// ffmpeg budget; always strictly below the request timeout.
pub fn frame_timeout(request_timeout_secs: u64) -> Duration {
    let request = Duration::from_secs(request_timeout_secs.max(1));
    let margin = Duration::from_secs(FRAME_EXTRACTION_MARGIN_SECS);
    if request > margin * 2 {
        request - margin
    } else {
        request / 2
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub media: MediaState,
    pub draw: DrawState,
    pub frames: Arc<FrameExtractor>,
    pub max_frames: u32,
}

impl AppState {
    pub fn new(config: Config, host: Arc<dyn MediaHost>) -> Self {
        let media = MediaState {
            host,
            image_validator: MediaValidator::new(
                config.max_file_size_bytes(),
                config.allowed_extensions().to_vec(),
                config.allowed_content_types().to_vec(),
            ),
            video_validator: MediaValidator::new(
                config.max_video_size_bytes(),
                config.video_allowed_extensions().to_vec(),
                config.video_allowed_content_types().to_vec(),
            ),
            upload_tmp_dir: config.upload_tmp_dir().map(PathBuf::from),
        };

        let draw = DrawState {
            max_dimension: config.max_canvas_dimension(),
            jpeg_quality: config.jpeg_quality(),
        };

        let frames = FrameExtractor::new(config.ffmpeg_path())
            .with_timeout(frame_timeout(config.request_timeout_secs()));

        Self {
            max_frames: config.max_frames(),
            config,
            media,
            draw,
            frames: Arc::new(frames),
        }
    }
}
