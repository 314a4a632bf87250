use crate::cancel::CancellationToken;
use crate::config::{DownloaderConfig, MAX_RETRY_DELAY};
use crate::dispatch::{Route, StickerKind, render_size};
use crate::error::{AssetError, SetError, StickerError, StickerResult};
use crate::ffmpeg::{Converter, FfmpegConverter};
use crate::manifest::ManifestWriter;
use crate::models::{Manifest, Sticker};
use crate::progress::{ProgressReporter, SetProgress};
use crate::telegram::{StickerSource, TelegramClient};
use crate::tgs::TgsTranscoder;
use crate::tgs::rasterizer::Rasterizer;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Outcome of a set whose metadata was fetched.
#[derive(Debug)]
pub struct SetReport {
    pub name: String,
    pub title: String,
    pub total: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub failures: Vec<AssetError>,
    pub output_dir: PathBuf,
    /// `None` if writing `sticker.json` failed.
    pub manifest: Option<PathBuf>,
}

/// Downloads sticker sets one sticker at a time.
pub struct StickerDownloader {
    source: Box<dyn StickerSource>,
    raster: Box<dyn Converter>,
    video: Box<dyn Converter>,
    tgs: Arc<TgsTranscoder>,
    output_dir: PathBuf,
    retries: u32,
    skip_existing: bool,
    cancel: CancellationToken,
}

impl StickerDownloader {
    pub fn new(
        source: Box<dyn StickerSource>,
        raster: Box<dyn Converter>,
        video: Box<dyn Converter>,
        tgs: TgsTranscoder,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            raster,
            video,
            tgs: Arc::new(tgs),
            output_dir: output_dir.into(),
            retries: 0,
            skip_existing: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Telegram client plus ffmpeg converters, as configured.
    pub fn from_config(config: &DownloaderConfig, rasterizer: Box<dyn Rasterizer>) -> Result<Self, SetError> {
        let client = TelegramClient::new(config).map_err(SetError::Client)?;

        Ok(Self::new(
            Box::new(client),
            Box::new(FfmpegConverter::png(&config.ffmpeg)),
            Box::new(FfmpegConverter::gif(&config.ffmpeg)),
            TgsTranscoder::new(rasterizer),
            &config.output_dir,
        )
        .with_retries(config.retries)
        .with_skip_existing(config.skip_existing))
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Downloads every sticker of `name` into `<output>/<name>/`.
    ///
    /// Only set-level failures are returned as errors; a failed sticker is
    /// logged, counted and listed in the report. `sticker.json` is written
    /// whenever the metadata fetch succeeded.
    pub async fn download_set(&self, name: &str, progress: &ProgressReporter) -> Result<SetReport, SetError> {
        let set = self
            .source
            .sticker_set(name)
            .await
            .map_err(|source| SetError::Metadata {
                name: name.to_string(),
                source,
            })?;

        let set_dir = self.output_dir.join(name);
        fs::create_dir_all(&set_dir).map_err(|source| SetError::CreateDir {
            path: set_dir.clone(),
            source,
        })?;

        let total = set.stickers.len();
        let mut counters = SetProgress::new(total);
        let mut failures = Vec::new();
        let mut cancelled_at = None;

        info!("Downloading {} ({total} stickers) into {}", set.title, set_dir.display());
        progress.emit(name, counters.started(&set.title));

        for (i, sticker) in set.stickers.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled_at = Some(i);
                break;
            }
            let index = i + 1;
            progress.emit(name, counters.sticker_started(index));

            match self.download_sticker(sticker, &set_dir, index, total).await {
                Ok(path) => {
                    debug!(path = %path.display(), "sticker saved");
                    counters.success_count += 1;
                }
                Err(error) => {
                    error!("Failed to download sticker {}: {error}", sticker.file_id);
                    counters.failed_count += 1;
                    failures.push(AssetError {
                        index,
                        file_unique_id: sticker.file_unique_id.clone(),
                        error,
                    });
                }
            }

            progress.emit(name, counters.sticker_finished(index));
        }

        info!(
            "Done: {} success, {} failed",
            counters.success_count, counters.failed_count
        );

        let writer = ManifestWriter::new(&set_dir);
        let manifest = match writer.save(&Manifest::for_set(name, &set)) {
            Ok(()) => Some(writer.path().to_path_buf()),
            Err(e) => {
                error!("Failed to write manifest for {name}: {e:#}");
                None
            }
        };

        if let Some(processed) = cancelled_at {
            warn!("Download of {name} cancelled after {processed}/{total} stickers");
            return Err(SetError::Cancelled {
                name: name.to_string(),
                processed,
                total,
            });
        }

        progress.emit(name, counters.finished(&set.title));

        Ok(SetReport {
            name: name.to_string(),
            title: set.title,
            total,
            success_count: counters.success_count,
            failed_count: counters.failed_count,
            failures,
            output_dir: set_dir,
            manifest,
        })
    }

    async fn download_sticker(
        &self,
        sticker: &Sticker,
        set_dir: &Path,
        index: usize,
        total: usize,
    ) -> StickerResult<PathBuf> {
        let route = Route::for_sticker(sticker);
        let output = set_dir.join(&route.file_name);

        if self.skip_existing && is_nonempty_file(&output) {
            info!("Sticker {index}/{total} already exists, skipping {}", route.file_name);
            return Ok(output);
        }

        info!("Downloading sticker {index}/{total}, id {}", sticker.file_id);
        let data = self.fetch_with_retry(&sticker.file_id).await?;

        info!(
            "Sticker {} is {}, {}x{}",
            sticker.file_unique_id, route.kind, sticker.width, sticker.height
        );

        // Converters write to a scratch file; only a finished one gets the real name.
        let partial = set_dir.join(route.partial_file_name());
        if let Err(e) = self.convert(route.kind, sticker, data, &partial).await {
            discard_partial(&partial);
            return Err(e);
        }
        fs::rename(&partial, &output).map_err(|e| {
            discard_partial(&partial);
            StickerError::encode_with(format!("cannot move {} into place", route.file_name), e)
        })?;

        Ok(output)
    }

    async fn convert(
        &self,
        kind: StickerKind,
        sticker: &Sticker,
        data: Vec<u8>,
        target: &Path,
    ) -> StickerResult<()> {
        match kind {
            StickerKind::Static => self.raster.convert(&data, target).await,
            StickerKind::Video => self.video.convert(&data, target).await,
            StickerKind::VectorAnimated => {
                let (width, height) = render_size(sticker);
                let tgs = Arc::clone(&self.tgs);
                let target = target.to_path_buf();
                // Rendering and dithering are CPU bound.
                tokio::task::spawn_blocking(move || tgs.transcode(&data, &target, width, height))
                    .await
                    .map_err(|e| StickerError::encode_with("TGS conversion task failed", e))??;
                Ok(())
            }
        }
    }

    async fn fetch_with_retry(&self, file_id: &str) -> StickerResult<Vec<u8>> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.source.download(file_id).await {
                Ok(data) => return Ok(data),
                Err(e) if attempt <= self.retries => {
                    let delay = retry_delay(attempt);
                    warn!(
                        "Fetching {file_id} failed ({e}), retry {attempt}/{} in {}s",
                        self.retries,
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                    if self.cancel.is_cancelled() {
                        return Err(StickerError::Cancelled);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Exponential backoff: 1s, 2s, 4s, ... capped.
fn retry_delay(attempt: u32) -> Duration {
    let secs = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_secs(secs).min(MAX_RETRY_DELAY)
}

fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove {}: {e}", path.display());
        }
    }
}

fn is_nonempty_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
}
