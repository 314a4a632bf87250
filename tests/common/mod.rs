#![allow(dead_code)]

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use sticker_dl::error::{StickerError, StickerResult};
use sticker_dl::ffmpeg::Converter;
use sticker_dl::models::{Sticker, StickerSet};
use sticker_dl::telegram::StickerSource;
use sticker_dl::tgs::rasterizer::{AnimationHandle, Rasterizer};

/// BGRA bytes of opaque red as the rasterizer emits them.
pub const RED_BGRA: [u8; 4] = [0, 0, 255, 255];

pub fn tgs_payload() -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(br#"{"v":"5.5.2","fr":20,"ip":0,"op":60,"w":512,"h":512,"layers":[]}"#)
        .unwrap();
    enc.finish().unwrap()
}

#[derive(Clone, Default)]
pub struct RasterStats {
    pub released: Arc<AtomicUsize>,
    pub keys: Arc<Mutex<Vec<String>>>,
    pub rendered: Arc<Mutex<Vec<usize>>>,
    pub render_threads: Arc<Mutex<Vec<ThreadId>>>,
}

impl RasterStats {
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.keys.lock().unwrap().len()
    }
}

/// Renders the left half transparent and the right half red.
pub struct FakeRasterizer {
    pub duration: f64,
    pub frame_rate: f64,
    pub total_frames: usize,
    pub reject: bool,
    pub stats: RasterStats,
}

impl FakeRasterizer {
    pub fn new(duration: f64, frame_rate: f64, total_frames: usize) -> Self {
        Self {
            duration,
            frame_rate,
            total_frames,
            reject: false,
            stats: RasterStats::default(),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::new(1.0, 30.0, 30)
        }
    }
}

struct FakeHandle {
    duration: f64,
    frame_rate: f64,
    total_frames: usize,
    stats: RasterStats,
}

impl Rasterizer for FakeRasterizer {
    fn load(&self, _json: &str, cache_key: &str) -> Option<Box<dyn AnimationHandle>> {
        self.stats.keys.lock().unwrap().push(cache_key.to_string());
        if self.reject {
            return None;
        }
        Some(Box::new(FakeHandle {
            duration: self.duration,
            frame_rate: self.frame_rate,
            total_frames: self.total_frames,
            stats: self.stats.clone(),
        }))
    }
}

impl AnimationHandle for FakeHandle {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn total_frames(&self) -> usize {
        self.total_frames
    }

    fn render(&mut self, frame: usize, buffer: &mut [u8], width: u32, height: u32, stride: usize) {
        self.stats.rendered.lock().unwrap().push(frame);
        self.stats.render_threads.lock().unwrap().push(std::thread::current().id());
        for y in 0..height as usize {
            for x in 0..width as usize {
                let px = &mut buffer[y * stride + x * 4..y * stride + x * 4 + 4];
                if x < width as usize / 2 {
                    px.copy_from_slice(&[0, 0, 0, 0]);
                } else {
                    px.copy_from_slice(&RED_BGRA);
                }
            }
        }
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn sticker(unique_id: &str, is_animated: bool, is_video: bool) -> Sticker {
    Sticker {
        file_id: format!("file-{unique_id}"),
        file_unique_id: unique_id.to_string(),
        width: 64,
        height: 64,
        is_animated,
        is_video,
    }
}

pub fn sticker_set(name: &str, stickers: Vec<Sticker>) -> StickerSet {
    StickerSet {
        name: name.to_string(),
        title: format!("{name} title"),
        description: String::new(),
        is_animated: false,
        is_video: false,
        stickers,
    }
}

/// In-memory source. Missing payloads fail with an API error.
pub struct FakeSource {
    pub set: Option<StickerSet>,
    pub payloads: HashMap<String, Vec<u8>>,
    /// Number of leading failures per file id before it succeeds.
    pub flaky: Mutex<HashMap<String, usize>>,
    pub downloads: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new(set: StickerSet) -> Self {
        Self {
            set: Some(set),
            payloads: HashMap::new(),
            flaky: Mutex::new(HashMap::new()),
            downloads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn missing() -> Self {
        Self {
            set: None,
            payloads: HashMap::new(),
            flaky: Mutex::new(HashMap::new()),
            downloads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_payload(mut self, file_id: &str, data: Vec<u8>) -> Self {
        self.payloads.insert(file_id.to_string(), data);
        self
    }
}

#[async_trait]
impl StickerSource for FakeSource {
    async fn sticker_set(&self, _name: &str) -> StickerResult<StickerSet> {
        self.set
            .clone()
            .ok_or_else(|| StickerError::api("Bad Request: STICKERSET_INVALID"))
    }

    async fn download(&self, file_id: &str) -> StickerResult<Vec<u8>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if let Some(left) = self.flaky.lock().unwrap().get_mut(file_id) {
            if *left > 0 {
                *left -= 1;
                return Err(StickerError::api("Too Many Requests"));
            }
        }
        self.payloads
            .get(file_id)
            .cloned()
            .ok_or_else(|| StickerError::api(format!("file {file_id} not found")))
    }
}

/// Writes a marker file, or fails like a crashed ffmpeg.
#[derive(Clone, Default)]
pub struct FakeConverter {
    pub fail: bool,
    /// Bytes written to the output before failing.
    pub leftover: Option<&'static [u8]>,
    pub calls: Arc<AtomicUsize>,
    pub on_convert: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl FakeConverter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Fails after writing a truncated file, as ffmpeg does with `-y`.
    pub fn failing_with_leftover() -> Self {
        Self {
            fail: true,
            leftover: Some(b"GIF89a-partial"),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Converter for FakeConverter {
    async fn convert(&self, data: &[u8], output: &Path) -> StickerResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.on_convert {
            hook();
        }
        if self.fail {
            if let Some(bytes) = self.leftover {
                std::fs::write(output, bytes).unwrap();
            }
            return Err(StickerError::process("ffmpeg", "exit status: 1", b"Invalid data found"));
        }
        std::fs::write(output, data).map_err(|e| StickerError::encode_with("write", e))
    }
}
