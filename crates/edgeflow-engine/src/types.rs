//! Core types for frame processing
//!
//! These types are used by the engine and converted to C-compatible
//! types in the FFI layer.

use std::fmt;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Transform applied to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub enum ProcessingMode {
    /// Byte-for-byte copy of the input
    #[default]
    Raw = 0,
    /// Edge map, white edges on black
    Edge = 1,
    /// Luminance replicated into R, G and B
    Grayscale = 2,
}

impl ProcessingMode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Unknown mode values fall back to [`ProcessingMode::Raw`].
impl From<i32> for ProcessingMode {
    fn from(value: i32) -> Self {
        match value {
            1 => Self::Edge,
            2 => Self::Grayscale,
            _ => Self::Raw,
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Raw => "raw",
            Self::Edge => "edge",
            Self::Grayscale => "grayscale",
        };
        f.write_str(name)
    }
}

/// Thresholds and aperture for edge extraction.
///
/// Copied once at the start of every EDGE call, so updates never affect a
/// frame that is already being processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeParameters {
    /// Hysteresis low threshold
    pub low: f64,
    /// Hysteresis high threshold
    pub high: f64,
    /// Sobel aperture (odd)
    pub aperture: u32,
}

impl EdgeParameters {
    pub const DEFAULT_LOW: f64 = 50.0;
    pub const DEFAULT_HIGH: f64 = 150.0;
    pub const DEFAULT_APERTURE: u32 = 3;

    pub fn new(low: f64, high: f64, aperture: u32) -> Result<Self> {
        let params = Self {
            low,
            high,
            aperture,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.low.is_finite() || self.low <= 0.0 {
            return Err(EngineError::InvalidParameters(format!(
                "low threshold must be positive, got {}",
                self.low
            )));
        }
        if !self.high.is_finite() || self.high <= 0.0 {
            return Err(EngineError::InvalidParameters(format!(
                "high threshold must be positive, got {}",
                self.high
            )));
        }
        if self.aperture % 2 == 0 || !(3..=7).contains(&self.aperture) {
            return Err(EngineError::InvalidParameters(format!(
                "aperture must be 3, 5 or 7, got {}",
                self.aperture
            )));
        }
        Ok(())
    }
}

impl Default for EdgeParameters {
    fn default() -> Self {
        Self {
            low: Self::DEFAULT_LOW,
            high: Self::DEFAULT_HIGH,
            aperture: Self::DEFAULT_APERTURE,
        }
    }
}

impl From<&EngineConfig> for EdgeParameters {
    fn from(config: &EngineConfig) -> Self {
        Self {
            low: config.canny_low_threshold,
            high: config.canny_high_threshold,
            aperture: config.aperture_size,
        }
    }
}

/// Outcome of a single `process` call. Always returned, even on failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingResult {
    /// Wall time spent in the transform (0.0 when `success` is false)
    pub processing_time_ms: f64,
    pub width: u32,
    pub height: u32,
    /// Mode actually applied (unknown requests resolve to RAW)
    pub mode: ProcessingMode,
    pub success: bool,
}

impl ProcessingResult {
    pub(crate) fn failed(width: u32, height: u32, mode: ProcessingMode) -> Self {
        Self {
            processing_time_ms: 0.0,
            width,
            height,
            mode,
            success: false,
        }
    }
}

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Uninitialized,
    Ready,
}

/// Which strategy produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Optimized,
    Fallback,
}
