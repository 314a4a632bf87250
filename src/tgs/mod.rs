//! TGS (gzipped Lottie) to animated GIF.
//!
//! A conversion runs decompress, load, inspect, plan, render and quantize
//! each frame, then encode. The loaded [`AnimationHandle`] is owned by
//! [`TgsTranscoder::transcode`] and dropped on every return path.

pub mod assemble;
pub mod palette;
pub mod plan;
pub mod rasterizer;

use crate::error::{StickerError, StickerResult};
use assemble::{GifFrame, gif_size, write_animation};
use flate2::read::GzDecoder;
use image::RgbaImage;
use plan::FramePlan;
use rasterizer::{AnimationHandle, Rasterizer};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// What a finished conversion produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranscodeSummary {
    pub duration: f64,
    pub frame_rate: f64,
    pub native_frames: usize,
    pub plan: FramePlan,
}

pub struct TgsTranscoder {
    rasterizer: Box<dyn Rasterizer>,
    conversions: AtomicU64,
}

impl TgsTranscoder {
    pub fn new(rasterizer: Box<dyn Rasterizer>) -> Self {
        Self {
            rasterizer,
            conversions: AtomicU64::new(0),
        }
    }

    pub fn transcode(
        &self,
        data: &[u8],
        output: &Path,
        width: u32,
        height: u32,
    ) -> StickerResult<TranscodeSummary> {
        // Refuse sizes the encoder cannot take before allocating frames.
        gif_size(width, height)?;
        let json = decompress(data)?;

        let seq = self.conversions.fetch_add(1, Ordering::Relaxed);
        let cache_key = format!("tgs_{}_{}_{}", std::process::id(), seq, output.display());
        let mut handle = self
            .rasterizer
            .load(&json, &cache_key)
            .ok_or_else(|| StickerError::decode("rasterizer could not load the Lottie animation"))?;

        let duration = handle.duration();
        let frame_rate = handle.frame_rate();
        let native_frames = handle.total_frames();
        if native_frames == 0 {
            return Err(StickerError::EmptyAnimation);
        }

        let plan = FramePlan::new(duration, frame_rate);
        info!(
            "TGS animation: {duration:.2}s, {frame_rate:.2} fps, {native_frames} native frames -> {} frames, delay {}/100s",
            plan.frame_count, plan.delay
        );

        let frames = render_frames(handle.as_mut(), &plan, native_frames, width, height)?;
        write_animation(output, width, height, &frames)?;

        info!(output = %output.display(), "TGS converted to GIF");
        Ok(TranscodeSummary {
            duration,
            frame_rate,
            native_frames,
            plan,
        })
    }
}

fn decompress(data: &[u8]) -> StickerResult<String> {
    let mut json = String::new();
    GzDecoder::new(data)
        .read_to_string(&mut json)
        .map_err(|e| StickerError::decode(format!("invalid TGS payload: {e}")))?;
    Ok(json)
}

fn render_frames(
    handle: &mut dyn AnimationHandle,
    plan: &FramePlan,
    native_frames: usize,
    width: u32,
    height: u32,
) -> StickerResult<Vec<GifFrame>> {
    let stride = width as usize * 4;
    let mut frames = Vec::with_capacity(plan.frame_count);

    for i in 0..plan.frame_count {
        let mut buffer = vec![0u8; stride * height as usize];
        handle.render(plan.source_frame(i, native_frames), &mut buffer, width, height, stride);
        bgra_to_rgba(&mut buffer);

        let rgba = RgbaImage::from_raw(width, height, buffer)
            .ok_or_else(|| StickerError::encode("rendered frame has the wrong size"))?;
        frames.push(GifFrame::new(palette::quantize(&rgba), plan.delay));

        if (i + 1) % 10 == 0 || i + 1 == plan.frame_count {
            debug!("TGS render progress: {}/{} frames", i + 1, plan.frame_count);
        }
    }

    Ok(frames)
}

fn bgra_to_rgba(buffer: &mut [u8]) {
    for px in buffer.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}
