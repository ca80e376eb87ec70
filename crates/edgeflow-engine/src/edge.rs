//! Edge detection.
//!
//! [`EdgeDetector`] serves EDGE frames through the strategy set: the
//! optimized Gaussian + Canny pipeline when available, otherwise (or when it
//! faults) the Sobel fallback implemented here.
//!
//! ## Fallback algorithm
//!
//! 1. Luminance with the reference 0.299/0.587/0.114 weights
//! 2. 3x3 Sobel gradient on interior pixels; the 1px border stays 0
//! 3. Magnitude `sqrt(gx² + gy²)` clamped to 255
//! 4. Binary threshold at [`FALLBACK_EDGE_THRESHOLD`]
//! 5. Expansion to RGBA with opaque alpha

use std::sync::Arc;

use crate::backend::{Execution, StrategySet};
use crate::error::Result;
use crate::frame::Frame;
use crate::luma::{expand_to_rgba, rgba_to_luma, threshold_in_place};
use crate::types::EdgeParameters;

/// Magnitudes strictly above this become edges in the fallback map.
pub const FALLBACK_EDGE_THRESHOLD: u8 = 50;

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Sobel gradient magnitude of a single-channel image.
///
/// Border pixels are left at zero rather than extrapolated. Frames narrower
/// or shorter than 3 pixels have no interior and produce an all-zero map.
pub fn sobel_magnitude(gray: &[u8], width: usize, height: usize) -> Vec<u8> {
    debug_assert_eq!(gray.len(), width * height);
    let mut magnitude = vec![0u8; width * height];

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mut gx = 0i32;
            let mut gy = 0i32;

            for ky in 0..3 {
                let row = (y + ky - 1) * width;
                for kx in 0..3 {
                    let pixel = gray[row + x + kx - 1] as i32;
                    gx += pixel * SOBEL_X[ky][kx];
                    gy += pixel * SOBEL_Y[ky][kx];
                }
            }

            let mag = ((gx * gx + gy * gy) as f64).sqrt();
            magnitude[y * width + x] = mag.min(255.0) as u8;
        }
    }

    magnitude
}

/// Full fallback edge pipeline over an RGBA frame.
///
/// `output` must be the frame-sized region; every byte is overwritten.
pub fn sobel_edges(frame: &Frame<'_>, output: &mut [u8]) {
    let gray = rgba_to_luma(frame);
    let mut edges = sobel_magnitude(&gray, frame.width() as usize, frame.height() as usize);
    threshold_in_place(&mut edges, FALLBACK_EDGE_THRESHOLD);
    expand_to_rgba(&edges, output);
}

/// EDGE mode transform.
#[derive(Clone)]
pub struct EdgeDetector {
    strategies: Arc<StrategySet>,
}

impl EdgeDetector {
    pub fn new(strategies: Arc<StrategySet>) -> Self {
        Self { strategies }
    }

    /// Write an edge map of `frame` into `output`.
    ///
    /// `params` is a snapshot taken by the caller before the call.
    pub fn detect(
        &self,
        frame: &Frame<'_>,
        params: &EdgeParameters,
        output: &mut [u8],
    ) -> Result<Execution> {
        self.strategies.execute_where(
            "edge",
            |backend| backend.supports_aperture(params.aperture),
            output,
            |backend, out| backend.detect_edges(frame, params, out),
        )
    }
}
