//! Dependency-free strategy: fixed-point Sobel and grayscale.

use crate::edge::sobel_edges;
use crate::error::Result;
use crate::frame::Frame;
use crate::grayscale::grayscale_fallback;
use crate::types::EdgeParameters;

use super::TransformBackend;

/// Always-available strategy.
///
/// Edge parameters are ignored: the map always uses the 3x3 Sobel kernel
/// and is binarized at a fixed level, so the output stays deterministic
/// regardless of tuning. Larger apertures are only honoured by an optimized
/// backend that reports support for them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackBackend;

impl TransformBackend for FallbackBackend {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn detect_edges(
        &self,
        frame: &Frame<'_>,
        _params: &EdgeParameters,
        output: &mut [u8],
    ) -> Result<()> {
        sobel_edges(frame, output);
        Ok(())
    }

    fn to_grayscale(&self, frame: &Frame<'_>, output: &mut [u8]) -> Result<()> {
        grayscale_fallback(frame, output);
        Ok(())
    }
}
