use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const SHARE_URL_PREFIX: &str = "https://t.me/addstickers/";
pub const MANIFEST_FILE_NAME: &str = "sticker.json";

/// Applies to every HTTP request; external processes have no bound.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Width static stickers are scaled to when re-encoded as PNG.
pub const PNG_SCALE_WIDTH: u32 = 512;

/// Render size for vector animations whose declared size is missing.
pub const FALLBACK_RENDER_SIZE: u32 = 256;

/// Upper bound of the per-asset retry backoff.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub api_base: String,
    pub token: String,
    pub proxy: Option<String>,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub ffmpeg: PathBuf,
    pub retries: u32,
    pub skip_existing: bool,
}

impl DownloaderConfig {
    pub fn new(token: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            proxy: None,
            timeout: REQUEST_TIMEOUT,
            output_dir: output_dir.into(),
            ffmpeg: PathBuf::from("ffmpeg"),
            retries: 0,
            skip_existing: false,
        }
    }
}
