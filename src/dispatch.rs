use crate::config::FALLBACK_RENDER_SIZE;
use crate::models::Sticker;
use std::fmt;

/// How a sticker's payload is encoded on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickerKind {
    /// WebP image.
    Static,
    /// Gzipped Lottie JSON (TGS).
    VectorAnimated,
    /// WebM video.
    Video,
}

impl StickerKind {
    pub fn of(sticker: &Sticker) -> Self {
        if sticker.is_video {
            Self::Video
        } else if sticker.is_animated {
            Self::VectorAnimated
        } else {
            Self::Static
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Static => "png",
            Self::VectorAnimated | Self::Video => "gif",
        }
    }
}

impl fmt::Display for StickerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Static => "static",
            Self::VectorAnimated => "vector-animated",
            Self::Video => "video",
        })
    }
}

/// Classification of one sticker plus where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub kind: StickerKind,
    pub file_name: String,
}

impl Route {
    pub fn for_sticker(sticker: &Sticker) -> Self {
        let kind = StickerKind::of(sticker);
        Self {
            kind,
            file_name: format!("{}.{}", sticker.file_unique_id, kind.extension()),
        }
    }

    /// Name converted output is written under until it is complete. The
    /// extension stays last so ffmpeg still picks the right muxer.
    pub fn partial_file_name(&self) -> String {
        let ext = self.kind.extension();
        let stem = self
            .file_name
            .strip_suffix(ext)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(&self.file_name);
        format!("{stem}.part.{ext}")
    }
}

/// Vector animations render at half the declared size.
pub fn render_size(sticker: &Sticker) -> (u32, u32) {
    let half = |v: u32| match v / 2 {
        0 => FALLBACK_RENDER_SIZE,
        n => n,
    };
    (half(sticker.width), half(sticker.height))
}
