//! Library-backed strategy built on `image` and `imageproc`.
//!
//! Edge pipeline: RGBA -> luma -> 5x5 Gaussian (sigma 1.5) -> Canny with
//! hysteresis -> RGBA. Results are assembled in owned image buffers and only
//! copied into the caller's output once complete, so a failure part-way
//! leaves the output untouched for the fallback.

use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;

use crate::error::{EngineError, Result};
use crate::frame::Frame;
use crate::types::EdgeParameters;

use super::TransformBackend;

const BLUR_SIGMA: f32 = 1.5;
const BLUR_RADIUS: usize = 2;
const BLUR_TAPS: usize = 2 * BLUR_RADIUS + 1;

/// imageproc's Canny computes gradients with a 3x3 Sobel.
const SUPPORTED_APERTURE: u32 = 3;

const PROBE_SIZE: u32 = 8;

/// Normalized 1-D Gaussian; applied separably it forms the 5x5 kernel.
fn gaussian_kernel(sigma: f32) -> [f32; BLUR_TAPS] {
    let mut kernel = [0f32; BLUR_TAPS];
    let denom = 2.0 * sigma * sigma;
    for (i, w) in kernel.iter_mut().enumerate() {
        let d = i as f32 - BLUR_RADIUS as f32;
        *w = (-(d * d) / denom).exp();
    }
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// Fixed-point BT.601 luma, rounded: `(4899R + 9617G + 1868B + 8192) >> 14`.
///
/// Within one level of the fallback's truncated weights.
#[inline]
fn rounded_luma(r: u8, g: u8, b: u8) -> u8 {
    ((4899 * r as u32 + 9617 * g as u32 + 1868 * b as u32 + 8192) >> 14) as u8
}

/// Strategy using `imageproc` filters.
#[derive(Debug, Clone)]
pub struct ImageprocBackend {
    blur_kernel: [f32; BLUR_TAPS],
}

impl ImageprocBackend {
    pub fn new() -> Self {
        Self {
            blur_kernel: gaussian_kernel(BLUR_SIGMA),
        }
    }

    fn luma_image(frame: &Frame<'_>) -> Result<GrayImage> {
        let luma: Vec<u8> = frame
            .pixels()
            .map(|px| rounded_luma(px[0], px[1], px[2]))
            .collect();
        GrayImage::from_raw(frame.width(), frame.height(), luma).ok_or_else(|| {
            EngineError::Backend(format!(
                "cannot build {}x{} luma image",
                frame.width(),
                frame.height()
            ))
        })
    }

    /// Expand a single-channel image to RGBA and copy it out.
    fn write_rgba(gray: GrayImage, output: &mut [u8]) -> Result<()> {
        let rgba = DynamicImage::ImageLuma8(gray).into_rgba8();
        let raw = rgba.as_raw();
        if raw.len() != output.len() {
            return Err(EngineError::Backend(format!(
                "rgba expansion produced {} bytes, expected {}",
                raw.len(),
                output.len()
            )));
        }
        output.copy_from_slice(raw);
        Ok(())
    }

    fn edge_map(&self, frame: &Frame<'_>, params: &EdgeParameters) -> Result<GrayImage> {
        if params.aperture != SUPPORTED_APERTURE {
            return Err(EngineError::Backend(format!(
                "aperture {} not supported, only {}",
                params.aperture, SUPPORTED_APERTURE
            )));
        }

        let gray = Self::luma_image(frame)?;
        let blurred: GrayImage = separable_filter_equal(&gray, &self.blur_kernel[..]);

        // Hysteresis needs low <= high; swap like a caller would expect
        let (low, high) = if params.low <= params.high {
            (params.low, params.high)
        } else {
            (params.high, params.low)
        };
        Ok(canny(&blurred, low as f32, high as f32))
    }
}

impl Default for ImageprocBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformBackend for ImageprocBackend {
    fn name(&self) -> &'static str {
        "imageproc"
    }

    fn detect_edges(
        &self,
        frame: &Frame<'_>,
        params: &EdgeParameters,
        output: &mut [u8],
    ) -> Result<()> {
        let edges = self.edge_map(frame, params)?;
        Self::write_rgba(edges, output)
    }

    fn to_grayscale(&self, frame: &Frame<'_>, output: &mut [u8]) -> Result<()> {
        let gray = Self::luma_image(frame)?;
        Self::write_rgba(gray, output)
    }

    fn supports_aperture(&self, aperture: u32) -> bool {
        aperture == SUPPORTED_APERTURE
    }

    /// Run the edge pipeline over a small synthetic frame.
    fn probe(&self) -> Result<()> {
        let side = PROBE_SIZE as usize;
        let mut data = Vec::with_capacity(side * side * 4);
        for _ in 0..side {
            for x in 0..side {
                let v = if x < side / 2 { 0 } else { 255 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let frame = Frame::new(&data, PROBE_SIZE, PROBE_SIZE)?;
        let edges = self.edge_map(&frame, &EdgeParameters::default())?;
        if edges.dimensions() != (PROBE_SIZE, PROBE_SIZE) {
            return Err(EngineError::Backend("probe produced wrong dimensions".into()));
        }
        Ok(())
    }
}
