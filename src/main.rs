use anyhow::{Context, Result, anyhow};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sticker_dl::cli::Args;
use sticker_dl::ffmpeg::is_ffmpeg_available;
use sticker_dl::models::ProgressEvent;
use sticker_dl::tgs::rasterizer::{default_rasterizer, has_rendering_backend};
use sticker_dl::{CancellationToken, ProgressReporter, StickerDownloader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sticker_dl=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn spawn_progress_printer(mut rx: UnboundedReceiver<ProgressEvent>, json: bool) -> Result<JoinHandle<()>> {
    if json {
        return Ok(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!("Failed to serialize progress event: {e}"),
                }
            }
        }));
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} {bar:40} {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    Ok(tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let p = &event.progress;
            pb.set_prefix(event.set_name.clone());
            pb.set_length(p.total as u64);
            pb.set_position(p.current as u64);
            pb.set_message(p.status.clone());
            if p.current == p.total && p.percentage >= 100.0 {
                pb.println(format!("{}: {}", event.set_name, p.status));
            }
        }
        pb.finish_and_clear();
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = args.to_config();

    if !is_ffmpeg_available(&config.ffmpeg) {
        warn!(
            "{} not found; static and video stickers will fail",
            config.ffmpeg.display()
        );
    }
    if !has_rendering_backend() {
        warn!("Built without the rlottie feature; animated (TGS) stickers will fail");
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current sticker");
                cancel.cancel();
            }
        });
    }

    let downloader = StickerDownloader::from_config(&config, default_rasterizer())
        .context("Failed to set up downloader")?
        .with_cancellation(cancel.clone());

    let (reporter, rx) = ProgressReporter::channel();
    let printer = spawn_progress_printer(rx, args.json)?;

    let mut failed_sets = Vec::new();
    for name in &args.sets {
        if cancel.is_cancelled() {
            break;
        }
        match downloader.download_set(name, &reporter).await {
            Ok(report) => {
                for failure in &report.failures {
                    warn!("{failure}");
                }
                eprintln!(
                    "{} ({}): {} success, {} failed -> {}",
                    report.title,
                    report.name,
                    report.success_count,
                    report.failed_count,
                    report.output_dir.display()
                );
            }
            Err(e) => {
                error!("{e}");
                failed_sets.push(name.clone());
            }
        }
    }

    drop(reporter);
    printer.await.context("Progress printer task failed")?;

    if !failed_sets.is_empty() {
        return Err(anyhow!("Failed sticker sets: {}", failed_sets.join(", ")));
    }

    Ok(())
}
