//! Static and video stickers are converted by piping them through ffmpeg.

use crate::config::PNG_SCALE_WIDTH;
use crate::error::{StickerError, StickerResult};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Turns raw sticker bytes into a file at `output`.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, data: &[u8], output: &Path) -> StickerResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfmpegProfile {
    /// WebP to an RGBA PNG scaled to a fixed width.
    Png,
    /// VP9 WebM to a looping GIF with a generated palette.
    Gif,
}

impl FfmpegProfile {
    fn args(self, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error"]
            .into_iter()
            .map(OsString::from)
            .collect();

        let profile: Vec<String> = match self {
            Self::Png => vec![
                "-i".into(),
                "pipe:0".into(),
                "-vf".into(),
                format!("scale={PNG_SCALE_WIDTH}:-1:flags=lanczos"),
                "-c:v".into(),
                "png".into(),
                "-pix_fmt".into(),
                "rgba".into(),
            ],
            Self::Gif => vec![
                "-vcodec".into(),
                "libvpx-vp9".into(),
                "-i".into(),
                "pipe:0".into(),
                "-vf".into(),
                "split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse".into(),
                "-loop".into(),
                "0".into(),
            ],
        };
        args.extend(profile.into_iter().map(OsString::from));
        args.push("-y".into());
        args.push(output.as_os_str().to_owned());
        args
    }
}

pub struct FfmpegConverter {
    program: PathBuf,
    profile: FfmpegProfile,
}

impl FfmpegConverter {
    pub fn new(program: impl Into<PathBuf>, profile: FfmpegProfile) -> Self {
        Self {
            program: program.into(),
            profile,
        }
    }

    pub fn png(program: impl Into<PathBuf>) -> Self {
        Self::new(program, FfmpegProfile::Png)
    }

    pub fn gif(program: impl Into<PathBuf>) -> Self {
        Self::new(program, FfmpegProfile::Gif)
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    async fn convert(&self, data: &[u8], output: &Path) -> StickerResult<()> {
        debug!(program = %self.program.display(), profile = ?self.profile, output = %output.display(), "running converter");

        let mut child = Command::new(&self.program)
            .args(self.profile.args(output))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                StickerError::process(self.program_name(), format!("spawn failed: {e}"), b"")
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            StickerError::process(self.program_name(), "stdin unavailable", b"")
        })?;

        // stderr is drained while stdin is written so neither pipe can fill up.
        let feed = async move {
            let result = stdin.write_all(data).await;
            drop(stdin);
            result
        };
        let (fed, output_result) = tokio::join!(feed, child.wait_with_output());

        let out = output_result.map_err(|e| {
            StickerError::process(self.program_name(), format!("wait failed: {e}"), b"")
        })?;

        if !out.status.success() {
            return Err(StickerError::process(
                self.program_name(),
                out.status.to_string(),
                &out.stderr,
            ));
        }

        if let Err(e) = fed {
            return Err(StickerError::process(
                self.program_name(),
                format!("stdin write failed: {e}"),
                &out.stderr,
            ));
        }

        Ok(())
    }
}

pub fn is_ffmpeg_available(program: &Path) -> bool {
    std::process::Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
