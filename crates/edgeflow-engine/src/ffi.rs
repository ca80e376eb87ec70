//! C-compatible FFI interface for the frame engine
//!
//! Exposes the engine lifecycle, frame processing, edge parameter updates,
//! statistics, and YUV conversion through a C ABI for camera hosts
//! (Android NDK, iOS, desktop capture loops).
//!
//! # Memory Ownership Rules
//!
//! - `edgeflow_engine_new*()` allocates on the Rust heap, caller owns pointer
//! - `edgeflow_engine_free()` must be called to deallocate
//! - Pixel buffers stay owned by the caller; the engine only borrows them
//!   for the duration of one call
//! - Strings returned by `edgeflow_engine_statistics_string()` must be freed
//!   with `edgeflow_string_free()`
//!
//! # Thread Safety
//!
//! The engine is internally synchronized. Statistics may be read from any
//! thread while another thread processes frames; run at most one
//! `edgeflow_engine_process` per engine at a time.
//!
//! # Safety
//!
//! All public FFI functions handle null pointer checks internally.
//! The caller is responsible for passing valid pointers and lengths.

use std::os::raw::c_char;
use std::ptr;

use edgeflow_ffi_common::{bytes_from_raw, bytes_from_raw_mut, cstr_to_str, cstring_new_or_fallback};
use tracing::error;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::frame::frame_len;
use crate::types::{ProcessingMode, ProcessingResult};
use crate::yuv::{convert_yuv420_to_rgba, Yuv420Planes};

// Safety limits for caller-declared sizes
const MAX_FRAME_SIZE: usize = 256 * 1024 * 1024; // 256MB max frame
const MAX_CONFIG_LEN: usize = 64 * 1024;

/// C-compatible processing result
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessingResultC {
    /// True if the frame was written to the output buffer
    pub success: bool,
    /// Processing time in milliseconds (0 on failure)
    pub processing_time_ms: f64,
    /// Frame width processed
    pub width: u32,
    /// Frame height processed
    pub height: u32,
    /// Mode applied (0=RAW, 1=EDGE, 2=GRAYSCALE)
    pub mode: i32,
}

impl ProcessingResultC {
    fn failed(width: u32, height: u32, mode: ProcessingMode) -> Self {
        Self {
            success: false,
            processing_time_ms: 0.0,
            width,
            height,
            mode: mode.as_i32(),
        }
    }
}

impl From<ProcessingResult> for ProcessingResultC {
    fn from(result: ProcessingResult) -> Self {
        Self {
            success: result.success,
            processing_time_ms: result.processing_time_ms,
            width: result.width,
            height: result.height,
            mode: result.mode.as_i32(),
        }
    }
}

/// C-compatible statistics snapshot
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticsC {
    /// Frames processed since initialization
    pub frame_count: u64,
    /// Average processing time (milliseconds)
    pub average_ms: f64,
    /// Last frame processing time (milliseconds)
    pub last_ms: f64,
    /// Cumulative processing time (milliseconds)
    pub total_ms: f64,
    /// Frames served by the fallback after an optimized-backend failure
    pub backend_faults: u64,
    /// Optimized backend in use
    pub optimized_available: bool,
}

/// C-compatible engine configuration
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct EngineConfigC {
    /// Initial Canny low threshold
    pub canny_low_threshold: f64,
    /// Initial Canny high threshold
    pub canny_high_threshold: f64,
    /// Sobel aperture (3, 5 or 7)
    pub aperture_size: u32,
    /// Use the optimized backend when available
    pub prefer_optimized: bool,
    /// Log statistics every N frames (0 disables)
    pub stats_log_interval: u64,
}

impl From<&EngineConfigC> for EngineConfig {
    fn from(config: &EngineConfigC) -> Self {
        Self {
            canny_low_threshold: config.canny_low_threshold,
            canny_high_threshold: config.canny_high_threshold,
            aperture_size: config.aperture_size,
            prefer_optimized: config.prefer_optimized,
            stats_log_interval: config.stats_log_interval,
        }
    }
}

fn boxed_engine(config: EngineConfig) -> *mut Engine {
    match Engine::new(config) {
        Ok(engine) => Box::into_raw(Box::new(engine)),
        Err(e) => {
            error!(error = %e, "Failed to create engine");
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Engine Lifecycle
// ============================================================================

/// Create a new engine with default configuration.
///
/// # Returns
/// Pointer to an uninitialized engine. Caller owns the pointer and must
/// call `edgeflow_engine_free` to deallocate.
#[no_mangle]
pub extern "C" fn edgeflow_engine_new() -> *mut Engine {
    Box::into_raw(Box::new(Engine::with_defaults()))
}

/// Create a new engine with custom configuration.
///
/// # Returns
/// Pointer to engine, or NULL if `config` is null or invalid.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edgeflow_engine_new_with_config(config: *const EngineConfigC) -> *mut Engine {
    if config.is_null() {
        return ptr::null_mut();
    }
    let config = unsafe { &*config };
    boxed_engine(EngineConfig::from(config))
}

/// Create a new engine from a JSON configuration document.
///
/// Missing keys take their defaults.
///
/// # Returns
/// Pointer to engine, or NULL if the JSON is null, too long, or invalid.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edgeflow_engine_new_from_json(json: *const c_char) -> *mut Engine {
    let json = match unsafe { cstr_to_str(json) } {
        Ok(s) if s.len() <= MAX_CONFIG_LEN => s,
        Ok(_) => return ptr::null_mut(), // too long
        Err(_) => return ptr::null_mut(),
    };

    match EngineConfig::from_json(json) {
        Ok(config) => boxed_engine(config),
        Err(e) => {
            error!(error = %e, "Invalid engine configuration");
            ptr::null_mut()
        }
    }
}

edgeflow_ffi_common::define_engine_free!(edgeflow_engine_free, Engine);

/// Initialize the engine and probe the optimized backend.
///
/// Idempotent. Returns false only for a null engine.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edgeflow_engine_initialize(engine: *const Engine) -> bool {
    if engine.is_null() {
        return false;
    }
    let engine = unsafe { &*engine };
    engine.initialize()
}

/// Release engine resources and return to the uninitialized state.
///
/// Idempotent; safe on a never-initialized engine and on NULL.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edgeflow_engine_release(engine: *const Engine) {
    if engine.is_null() {
        return;
    }
    let engine = unsafe { &*engine };
    engine.release();
}

/// Check if the engine accepts frames.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edgeflow_engine_is_ready(engine: *const Engine) -> bool {
    if engine.is_null() {
        return false;
    }
    let engine = unsafe { &*engine };
    engine.is_ready()
}

/// Check if the optimized backend is in use.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edgeflow_engine_is_optimized_available(engine: *const Engine) -> bool {
    if engine.is_null() {
        return false;
    }
    let engine = unsafe { &*engine };
    engine.is_optimized_backend_available()
}

// ============================================================================
// Frame Processing
// ============================================================================

/// Process a single RGBA frame.
///
/// # Arguments
/// - `engine`: Valid engine pointer
/// - `input` / `input_len`: RGBA pixels, at least `width * height * 4` bytes
/// - `width` / `height`: Frame dimensions in pixels
/// - `mode`: 0=RAW, 1=EDGE, 2=GRAYSCALE; other values behave as RAW
/// - `output` / `output_len`: Destination, at least `width * height * 4` bytes
///
/// # Returns
/// ProcessingResultC; `success` is false on any precondition violation, in
/// which case `output` is not written.
///
/// # Safety
/// - `input` must point to at least `input_len` readable bytes
/// - `output` must point to at least `output_len` writable bytes and must
///   not overlap `input`
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn edgeflow_engine_process(
    engine: *const Engine,
    input: *const u8,
    input_len: usize,
    width: u32,
    height: u32,
    mode: i32,
    output: *mut u8,
    output_len: usize,
) -> ProcessingResultC {
    let mode = ProcessingMode::from(mode);

    if engine.is_null() {
        error!("null engine pointer");
        return ProcessingResultC::failed(width, height, mode);
    }
    if input_len > MAX_FRAME_SIZE || output_len > MAX_FRAME_SIZE {
        error!(input_len, output_len, "frame size exceeds maximum");
        return ProcessingResultC::failed(width, height, mode);
    }

    let Some(input) = (unsafe { bytes_from_raw(input, input_len) }) else {
        error!("null or empty input buffer");
        return ProcessingResultC::failed(width, height, mode);
    };
    let Some(output) = (unsafe { bytes_from_raw_mut(output, output_len) }) else {
        error!("null or empty output buffer");
        return ProcessingResultC::failed(width, height, mode);
    };

    let engine = unsafe { &*engine };
    engine.process(input, width, height, mode, output).into()
}

/// Update Canny thresholds for subsequent EDGE frames.
///
/// # Returns
/// True if applied, false for a null engine or rejected values.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edgeflow_engine_set_edge_parameters(
    engine: *const Engine,
    low_threshold: f64,
    high_threshold: f64,
) -> bool {
    if engine.is_null() {
        return false;
    }
    let engine = unsafe { &*engine };
    engine
        .set_edge_parameters(low_threshold, high_threshold)
        .is_ok()
}

// ============================================================================
// Statistics
// ============================================================================

/// Get a statistics snapshot. Returns zeros for a null engine.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edgeflow_engine_get_statistics(engine: *const Engine) -> StatisticsC {
    if engine.is_null() {
        return StatisticsC::default();
    }
    let engine = unsafe { &*engine };
    let report = engine.statistics();

    StatisticsC {
        frame_count: report.snapshot.frame_count,
        average_ms: report.snapshot.average_ms,
        last_ms: report.snapshot.last_ms,
        total_ms: report.snapshot.total_ms,
        backend_faults: report.snapshot.backend_faults,
        optimized_available: report.optimized_available,
    }
}

/// Get a human-readable statistics line.
///
/// # Returns
/// Owned C string; free with `edgeflow_string_free`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn edgeflow_engine_statistics_string(engine: *const Engine) -> *mut c_char {
    if engine.is_null() {
        return cstring_new_or_fallback("Engine not created", "");
    }
    let engine = unsafe { &*engine };
    cstring_new_or_fallback(&engine.statistics_string(), "statistics unavailable")
}

// ============================================================================
// Utilities
// ============================================================================

/// Convert a YUV 4:2:0 camera frame to packed RGBA.
///
/// # Arguments
/// - `y` / `y_len`: Luma plane
/// - `u` / `u_len`, `v` / `v_len`: Chroma planes (may alias for interleaved layouts)
/// - `width` / `height`: Frame dimensions
/// - `y_row_stride`: Bytes per luma row
/// - `uv_row_stride`: Bytes per chroma row
/// - `uv_pixel_stride`: Bytes between chroma samples (1 planar, 2 interleaved)
/// - `output` / `output_len`: Destination, at least `width * height * 4` bytes
///
/// # Returns
/// True on success. On failure `output` is not written.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn edgeflow_yuv420_to_rgba(
    y: *const u8,
    y_len: usize,
    u: *const u8,
    u_len: usize,
    v: *const u8,
    v_len: usize,
    width: u32,
    height: u32,
    y_row_stride: u32,
    uv_row_stride: u32,
    uv_pixel_stride: u32,
    output: *mut u8,
    output_len: usize,
) -> bool {
    let planes = unsafe {
        (
            bytes_from_raw(y, y_len),
            bytes_from_raw(u, u_len),
            bytes_from_raw(v, v_len),
            bytes_from_raw_mut(output, output_len),
        )
    };
    let (Some(y), Some(u), Some(v), Some(output)) = planes else {
        error!("null or empty YUV plane or output buffer");
        return false;
    };

    let planes = Yuv420Planes {
        y,
        u,
        v,
        y_row_stride: y_row_stride as usize,
        uv_row_stride: uv_row_stride as usize,
        uv_pixel_stride: uv_pixel_stride as usize,
    };

    match convert_yuv420_to_rgba(&planes, width, height, output) {
        Ok(()) => true,
        Err(e) => {
            error!(width, height, error = %e, "YUV conversion failed");
            false
        }
    }
}

/// Get the RGBA buffer size for the given dimensions, or 0 if invalid.
#[no_mangle]
pub extern "C" fn edgeflow_expected_frame_size(width: u32, height: u32) -> usize {
    frame_len(width, height).unwrap_or(0)
}

/// Install a stderr tracing subscriber honouring `RUST_LOG`.
///
/// # Returns
/// False if a subscriber was already installed.
#[no_mangle]
pub extern "C" fn edgeflow_init_logging() -> bool {
    crate::logging::init()
}

edgeflow_ffi_common::define_string_free!(edgeflow_string_free);

edgeflow_ffi_common::define_version_fn!(edgeflow_version);
