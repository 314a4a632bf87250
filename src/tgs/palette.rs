//! Fixed 256-entry GIF palette and Floyd–Steinberg quantization.
//!
//! Slot 0 is fully transparent. Slots 1..=255 are the first 255 colors of the
//! Plan 9 color map, a fixed table that spreads evenly over hue and value. The
//! table is built at compile time and shared by every frame of every
//! conversion.

use image::RgbaImage;

pub const TRANSPARENT_INDEX: u8 = 0;

/// Pixels whose source alpha is below this are forced to the transparent slot.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Palette as RGBA. Entry 0 is `[0, 0, 0, 0]`, every other entry is opaque.
pub static PALETTE: [[u8; 4]; 256] = build_palette();

/// Palette as packed RGB triples, the layout of a GIF color table.
pub static GIF_PALETTE: [u8; 768] = build_gif_palette();

const fn plan9() -> [[u8; 3]; 256] {
    let mut out = [[0u8; 3]; 256];
    let mut r: i32 = 0;
    let mut i: i32 = 0;
    while r != 4 {
        let mut v: i32 = 0;
        while v != 4 {
            let mut j: i32 = v - r;
            let mut g: i32 = 0;
            while g != 4 {
                let mut b: i32 = 0;
                while b != 4 {
                    let mut den = r;
                    if g > den {
                        den = g;
                    }
                    if b > den {
                        den = b;
                    }
                    let rgb = if den == 0 {
                        [17 * v, 17 * v, 17 * v]
                    } else {
                        let num = 17 * (4 * den + v);
                        [r * num / den, g * num / den, b * num / den]
                    };
                    out[(i + (j & 0x0f)) as usize] = [rgb[0] as u8, rgb[1] as u8, rgb[2] as u8];
                    b += 1;
                    j += 1;
                }
                g += 1;
            }
            v += 1;
            i += 16;
        }
        r += 1;
    }
    out
}

const fn build_palette() -> [[u8; 4]; 256] {
    let map = plan9();
    let mut out = [[0u8; 4]; 256];
    let mut k = 1;
    while k < 256 {
        let c = map[k - 1];
        out[k] = [c[0], c[1], c[2], 255];
        k += 1;
    }
    out
}

const fn build_gif_palette() -> [u8; 768] {
    let palette = build_palette();
    let mut out = [0u8; 768];
    let mut k = 0;
    while k < 256 {
        out[k * 3] = palette[k][0];
        out[k * 3 + 1] = palette[k][1];
        out[k * 3 + 2] = palette[k][2];
        k += 1;
    }
    out
}

fn nearest(want: &[i32; 4]) -> usize {
    let mut best = 0;
    let mut best_dist = i32::MAX;
    for (idx, entry) in PALETTE.iter().enumerate() {
        let mut dist = 0;
        for c in 0..4 {
            let d = want[c] - entry[c] as i32;
            dist += d * d;
        }
        if dist < best_dist {
            best = idx;
            best_dist = dist;
            if dist == 0 {
                break;
            }
        }
    }
    best
}

/// Maps `frame` onto [`PALETTE`] with Floyd–Steinberg error diffusion and
/// returns one palette index per pixel, row-major.
///
/// The frame is taken as-is (the rasterizer emits premultiplied color, which
/// lines up with the transparent slot being black). After dithering, every
/// pixel with alpha below [`ALPHA_THRESHOLD`] is forced to
/// [`TRANSPARENT_INDEX`].
pub fn quantize(frame: &RgbaImage) -> Vec<u8> {
    let width = frame.width() as usize;
    let mut indices = vec![TRANSPARENT_INDEX; frame.pixels().len()];

    // Accumulated error in sixteenths, offset by one column on each side.
    let mut curr = vec![[0i32; 4]; width + 2];
    let mut next = vec![[0i32; 4]; width + 2];

    for (y, row) in frame.rows().enumerate() {
        for (x, px) in row.enumerate() {
            let mut want = [0i32; 4];
            for c in 0..4 {
                want[c] = (px.0[c] as i32 + curr[x + 1][c] / 16).clamp(0, 255);
            }

            let best = nearest(&want);
            indices[y * width + x] = best as u8;

            let chosen = PALETTE[best];
            for c in 0..4 {
                let err = want[c] - chosen[c] as i32;
                curr[x + 2][c] += err * 7;
                next[x][c] += err * 3;
                next[x + 1][c] += err * 5;
                next[x + 2][c] += err;
            }
        }
        std::mem::swap(&mut curr, &mut next);
        next.fill([0; 4]);
    }

    for (idx, px) in indices.iter_mut().zip(frame.pixels()) {
        if px.0[3] < ALPHA_THRESHOLD {
            *idx = TRANSPARENT_INDEX;
        }
    }

    indices
}
