//! Boundary to the component that turns Lottie JSON into pixels.

/// A loaded animation. Dropping the handle releases it.
pub trait AnimationHandle {
    /// Length in seconds.
    fn duration(&self) -> f64;

    /// Native frames per second, `0.0` if unknown.
    fn frame_rate(&self) -> f64;

    fn total_frames(&self) -> usize;

    /// Renders native frame `frame` into `buffer` as premultiplied BGRA,
    /// `stride` bytes per row.
    fn render(&mut self, frame: usize, buffer: &mut [u8], width: u32, height: u32, stride: usize);
}

pub trait Rasterizer: Send + Sync {
    /// `cache_key` must differ between conversions so no state is shared.
    /// Returns `None` when the payload is rejected.
    fn load(&self, json: &str, cache_key: &str) -> Option<Box<dyn AnimationHandle>>;
}

/// Rejects every payload; used when no rendering backend is compiled in.
#[derive(Debug, Default)]
pub struct UnavailableRasterizer;

impl Rasterizer for UnavailableRasterizer {
    fn load(&self, _json: &str, _cache_key: &str) -> Option<Box<dyn AnimationHandle>> {
        None
    }
}

/// The rasterizer selected at build time.
pub fn default_rasterizer() -> Box<dyn Rasterizer> {
    #[cfg(feature = "rlottie")]
    {
        Box::new(rlottie_backend::RlottieRasterizer)
    }
    #[cfg(not(feature = "rlottie"))]
    {
        Box::new(UnavailableRasterizer)
    }
}

pub fn has_rendering_backend() -> bool {
    cfg!(feature = "rlottie")
}

#[cfg(feature = "rlottie")]
mod rlottie_backend {
    use super::{AnimationHandle, Rasterizer};
    use rlottie::{Animation, Size, Surface};

    pub struct RlottieRasterizer;

    struct RlottieHandle {
        animation: Animation,
    }

    impl Rasterizer for RlottieRasterizer {
        fn load(&self, json: &str, cache_key: &str) -> Option<Box<dyn AnimationHandle>> {
            let animation = Animation::from_data(json, cache_key, "")?;
            Some(Box::new(RlottieHandle { animation }))
        }
    }

    impl AnimationHandle for RlottieHandle {
        fn duration(&self) -> f64 {
            self.animation.duration()
        }

        fn frame_rate(&self) -> f64 {
            self.animation.framerate()
        }

        fn total_frames(&self) -> usize {
            self.animation.totalframe()
        }

        fn render(&mut self, frame: usize, buffer: &mut [u8], width: u32, height: u32, stride: usize) {
            let mut surface = Surface::new(Size::new(width as usize, height as usize));
            self.animation.render(frame, &mut surface);

            let row_bytes = width as usize * 4;
            for (dst, src) in buffer
                .chunks_mut(stride)
                .zip(surface.data_as_bytes().chunks(row_bytes))
                .take(height as usize)
            {
                dst[..row_bytes].copy_from_slice(src);
            }
        }
    }
}
