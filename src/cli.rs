use crate::config::{DownloaderConfig, DEFAULT_API_BASE, REQUEST_TIMEOUT};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sticker-dl")]
#[command(author, version, about = "Download Telegram sticker sets as PNG and GIF files", long_about = None)]
pub struct Args {
    /// Sticker set names (the part after t.me/addstickers/)
    #[arg(required = true)]
    pub sets: Vec<String>,

    /// Output directory; each set gets its own subdirectory
    #[arg(short, long, default_value = "./stickers")]
    pub output: PathBuf,

    /// Bot API token
    #[arg(short, long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// HTTP proxy (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Bot API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// ffmpeg executable used for static and video stickers
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Extra download attempts per sticker
    #[arg(short, long, default_value = "0")]
    pub retries: u32,

    /// Keep stickers whose output file already exists
    #[arg(long)]
    pub skip_existing: bool,

    /// Print progress events as JSON lines instead of a progress bar
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn to_config(&self) -> DownloaderConfig {
        DownloaderConfig {
            api_base: self.api_base.trim_end_matches('/').to_string(),
            token: self.token.clone(),
            proxy: self.proxy.clone().filter(|p| !p.is_empty()),
            timeout: REQUEST_TIMEOUT,
            output_dir: self.output.clone(),
            ffmpeg: self.ffmpeg.clone(),
            retries: self.retries,
            skip_existing: self.skip_existing,
        }
    }
}
