//! EdgeFlow frame processing library
//!
//! Real-time per-frame image transforms for camera pipelines: raw
//! pass-through, grayscale, and edge maps over packed RGBA buffers.
//! Designed for hosts that drive a camera loop and call in through a C ABI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ YUV 4:2:0   │────▶│ yuv          │────▶│ RGBA frame       │
//! │ (camera)    │     │ (BT.601)     │     │ (w * h * 4)      │
//! └─────────────┘     └──────────────┘     └────────┬─────────┘
//!                                                   │
//!                     ┌──────────────┐              ▼
//!                     │ StrategySet  │◀──── ┌──────────────────┐
//!                     │ optimized ↓  │      │ Engine::process  │
//!                     │ fallback     │────▶ │ (mode, stats)    │
//!                     └──────────────┘      └──────────────────┘
//! ```
//!
//! ## Usage from C
//!
//! ```c
//! EdgeFlowEngine *engine = edgeflow_engine_new();
//! edgeflow_engine_initialize(engine);
//!
//! ProcessingResultC r = edgeflow_engine_process(
//!     engine, rgba, len, width, height, /* EDGE */ 1, out, len);
//!
//! edgeflow_engine_release(engine);
//! edgeflow_engine_free(engine);
//! ```
//!
//! ## Memory Ownership
//!
//! - `edgeflow_engine_new()` allocates on the Rust heap, caller owns pointer
//! - `edgeflow_engine_free()` must be called to deallocate
//! - Pixel buffers are caller-owned and only borrowed during a call
//! - Strings from `edgeflow_engine_statistics_string()` are freed with
//!   `edgeflow_string_free()`

pub mod backend;
pub mod config;
pub mod edge;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod frame;
pub mod grayscale;
pub mod logging;
pub mod luma;
pub mod stats;
pub mod types;
pub mod yuv;

// Re-export main types
pub use backend::TransformBackend;
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use frame::Frame;
pub use stats::{StatisticsReport, StatisticsSnapshot};
pub use types::{EdgeParameters, EngineState, ProcessingMode, ProcessingResult};
pub use yuv::{convert_yuv420_to_rgba, Yuv420Planes};

// Re-export FFI types for C consumers
pub use ffi::{EngineConfigC, ProcessingResultC, StatisticsC};
