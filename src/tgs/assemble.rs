use super::palette::{GIF_PALETTE, TRANSPARENT_INDEX};
use crate::error::{StickerError, StickerResult};
use gif::{DisposalMethod, Encoder, Frame, Repeat};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One palette-indexed output frame.
#[derive(Debug, Clone)]
pub struct GifFrame {
    pub indices: Vec<u8>,
    /// Hundredths of a second.
    pub delay: u16,
    pub dispose: DisposalMethod,
}

impl GifFrame {
    /// Frames are not composited onto each other, so each one clears back to
    /// the background before the next is drawn.
    pub fn new(indices: Vec<u8>, delay: u16) -> Self {
        Self {
            indices,
            delay,
            dispose: DisposalMethod::Background,
        }
    }
}

/// GIF dimensions are u16 and non-zero.
pub fn gif_size(width: u32, height: u32) -> StickerResult<(u16, u16)> {
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(StickerError::encode(format!(
            "unsupported GIF size {width}x{height}"
        ))),
    }
}

/// Encodes `frames` as a looping GIF at `path` using the shared palette.
pub fn write_animation(path: &Path, width: u32, height: u32, frames: &[GifFrame]) -> StickerResult<()> {
    let (w, h) = gif_size(width, height)?;

    let pixels = width as usize * height as usize;
    if let Some(bad) = frames.iter().position(|f| f.indices.len() != pixels) {
        return Err(StickerError::encode(format!(
            "frame {bad} has {} pixels, expected {pixels}",
            frames[bad].indices.len()
        )));
    }

    let file = File::create(path).map_err(|e| {
        StickerError::encode_with(format!("cannot create '{}'", path.display()), e)
    })?;

    let mut encoder = Encoder::new(BufWriter::new(file), w, h, &GIF_PALETTE)
        .map_err(|e| StickerError::encode_with("failed to write GIF header", e))?;
    encoder
        .set_repeat(Repeat::Infinite)
        .map_err(|e| StickerError::encode_with("failed to write loop extension", e))?;

    for (idx, frame) in frames.iter().enumerate() {
        let gif_frame = Frame {
            width: w,
            height: h,
            delay: frame.delay,
            dispose: frame.dispose,
            transparent: Some(TRANSPARENT_INDEX),
            buffer: Cow::Borrowed(&frame.indices),
            ..Frame::default()
        };
        encoder
            .write_frame(&gif_frame)
            .map_err(|e| StickerError::encode_with(format!("failed to write frame {idx}"), e))?;
    }

    let mut writer = encoder
        .into_inner()
        .map_err(|e| StickerError::encode_with("failed to finish GIF", e))?;
    writer
        .flush()
        .map_err(|e| StickerError::encode_with("failed to flush GIF", e))?;

    Ok(())
}
