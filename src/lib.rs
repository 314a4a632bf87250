//! Download Telegram sticker sets and normalize them to PNG (static stickers)
//! and GIF (TGS vector animations and WebM video stickers).

pub mod cancel;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod downloader;
pub mod error;
pub mod ffmpeg;
pub mod manifest;
pub mod models;
pub mod progress;
pub mod telegram;
pub mod tgs;

pub use cancel::CancellationToken;
pub use config::DownloaderConfig;
pub use downloader::{SetReport, StickerDownloader};
pub use error::{AssetError, SetError, StickerError, StickerResult};
pub use models::{DownloadProgress, Manifest, ProgressEvent, Sticker, StickerSet};
pub use progress::ProgressReporter;
