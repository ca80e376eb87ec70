//! Error types for the frame engine.

use thiserror::Error;

/// Result type alias using the engine error.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised inside the engine.
///
/// Per-frame errors never leave [`crate::Engine::process`]; they are folded
/// into the `success` flag of the returned [`crate::ProcessingResult`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height is zero, or the pixel count overflows `usize`
    #[error("invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A caller-supplied buffer cannot hold the frame
    #[error("{buffer} buffer too small: {actual} bytes, expected at least {expected}")]
    BufferTooSmall {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A frame view was built over a buffer of the wrong length
    #[error("frame length mismatch: {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// `process` was called before `initialize` or after `release`
    #[error("engine not initialized")]
    NotInitialized,

    /// Edge parameters rejected by validation
    #[error("invalid edge parameters: {0}")]
    InvalidParameters(String),

    /// Engine configuration rejected by validation
    #[error("configuration error: {0}")]
    Config(String),

    /// The optimized backend failed on a frame
    #[error("backend error: {0}")]
    Backend(String),

    /// The optimized backend is not compiled in or failed its probe
    #[error("optimized backend unavailable")]
    BackendUnavailable,

    /// JSON configuration could not be parsed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
