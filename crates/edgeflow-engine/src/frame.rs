//! RGBA frame views over caller-owned memory.
//!
//! The engine never allocates or frees caller buffers. A [`Frame`] borrows
//! the input bytes and carries the dimensions that were validated when it
//! was built, so the transform routines can index without re-checking.

use crate::error::{EngineError, Result};

/// Bytes per pixel of the only supported layout (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// Number of bytes in a tightly packed RGBA frame.
///
/// Row stride is always `width * 4`; padded rows must be repacked by the
/// caller.
pub fn frame_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
        .ok_or(EngineError::InvalidDimensions { width, height })
}

/// Immutable RGBA frame borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Frame<'a> {
    /// Build a view whose length must be exactly `width * height * 4`.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        let expected = frame_len(width, height)?;
        if data.len() != expected {
            return Err(EngineError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Build a view over the leading frame-sized region of a larger buffer.
    pub fn from_prefix(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        let expected = frame_len(width, height)?;
        if data.len() < expected {
            return Err(EngineError::BufferTooSmall {
                buffer: "input",
                expected,
                actual: data.len(),
            });
        }
        Self::new(&data[..expected], width, height)
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over pixels as `[r, g, b, a]` chunks.
    #[inline]
    pub fn pixels(&self) -> std::slice::ChunksExact<'a, u8> {
        self.data.chunks_exact(BYTES_PER_PIXEL)
    }

    /// Take the frame-sized prefix of an output buffer.
    ///
    /// Fails without touching the buffer when it is too small.
    pub fn output_region<'o>(&self, output: &'o mut [u8]) -> Result<&'o mut [u8]> {
        let expected = self.len();
        if output.len() < expected {
            return Err(EngineError::BufferTooSmall {
                buffer: "output",
                expected,
                actual: output.len(),
            });
        }
        Ok(&mut output[..expected])
    }
}
