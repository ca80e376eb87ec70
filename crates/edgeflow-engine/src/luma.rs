//! Luminance and channel helpers shared by both strategies.

use crate::frame::{Frame, BYTES_PER_PIXEL};

/// Reference luminance weights (BT.601) in thousandths: 0.299, 0.587, 0.114.
const WEIGHT_R: u32 = 299;
const WEIGHT_G: u32 = 587;
const WEIGHT_B: u32 = 114;
const WEIGHT_SCALE: u32 = 1000;

/// Opaque alpha written by every non-RAW transform.
pub const OPAQUE: u8 = 255;

/// `0.299R + 0.587G + 0.114B`, truncated toward zero.
///
/// Integer arithmetic keeps the truncation exact (white stays 255).
#[inline]
pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
    ((WEIGHT_R * r as u32 + WEIGHT_G * g as u32 + WEIGHT_B * b as u32) / WEIGHT_SCALE) as u8
}

/// Reduce an RGBA frame to one luminance byte per pixel. Alpha is ignored.
pub fn rgba_to_luma(frame: &Frame<'_>) -> Vec<u8> {
    frame
        .pixels()
        .map(|px| rgb_to_gray(px[0], px[1], px[2]))
        .collect()
}

/// Replicate a single-channel map into R, G and B with opaque alpha.
///
/// `output` must hold exactly `gray.len() * 4` bytes.
pub fn expand_to_rgba(gray: &[u8], output: &mut [u8]) {
    debug_assert_eq!(gray.len() * BYTES_PER_PIXEL, output.len());
    for (px, &value) in output.chunks_exact_mut(BYTES_PER_PIXEL).zip(gray) {
        px[0] = value;
        px[1] = value;
        px[2] = value;
        px[3] = OPAQUE;
    }
}

/// Binarize in place: values strictly above `threshold` become 255, the rest 0.
pub fn threshold_in_place(map: &mut [u8], threshold: u8) {
    for value in map.iter_mut() {
        *value = if *value > threshold { 255 } else { 0 };
    }
}
