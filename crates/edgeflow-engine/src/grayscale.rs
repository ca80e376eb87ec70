//! Grayscale conversion.

use std::sync::Arc;

use crate::backend::{Execution, StrategySet};
use crate::error::Result;
use crate::frame::{Frame, BYTES_PER_PIXEL};
use crate::luma::{rgb_to_gray, OPAQUE};

/// Per-pixel fallback: R=G=B=`rgb_to_gray`, A=255.
///
/// Writes in a single pass without an intermediate luminance buffer.
pub fn grayscale_fallback(frame: &Frame<'_>, output: &mut [u8]) {
    for (src, dst) in frame.pixels().zip(output.chunks_exact_mut(BYTES_PER_PIXEL)) {
        let gray = rgb_to_gray(src[0], src[1], src[2]);
        dst[0] = gray;
        dst[1] = gray;
        dst[2] = gray;
        dst[3] = OPAQUE;
    }
}

/// GRAYSCALE mode transform.
#[derive(Clone)]
pub struct GrayscaleConverter {
    strategies: Arc<StrategySet>,
}

impl GrayscaleConverter {
    pub fn new(strategies: Arc<StrategySet>) -> Self {
        Self { strategies }
    }

    pub fn convert(&self, frame: &Frame<'_>, output: &mut [u8]) -> Result<Execution> {
        self.strategies
            .execute("grayscale", output, |backend, out| {
                backend.to_grayscale(frame, out)
            })
    }
}
