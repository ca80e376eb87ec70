//! Frame processing engine
//!
//! Owns the lifecycle (create -> initialize -> process* -> release), the
//! edge parameters, and the statistics tracker. Designed for one frame in
//! flight per engine: `process` runs to completion on the calling thread
//! with no internal queue or thread pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::backend::{Execution, StrategySet, TransformBackend};
use crate::config::EngineConfig;
use crate::edge::EdgeDetector;
use crate::error::{EngineError, Result};
use crate::frame::Frame;
use crate::grayscale::GrayscaleConverter;
use crate::stats::{report_due, StatisticsReport, StatisticsTracker};
use crate::types::{EdgeParameters, EngineState, ProcessingMode, ProcessingResult};

/// Transforms built once per initialization.
struct Pipeline {
    strategies: Arc<StrategySet>,
    edges: EdgeDetector,
    grayscale: GrayscaleConverter,
}

impl Pipeline {
    fn new(strategies: StrategySet) -> Self {
        let strategies = Arc::new(strategies);
        Self {
            edges: EdgeDetector::new(Arc::clone(&strategies)),
            grayscale: GrayscaleConverter::new(Arc::clone(&strategies)),
            strategies,
        }
    }
}

/// Thread-safe frame transform engine.
///
/// Created uninitialized; `process` fails until [`Engine::initialize`] is
/// called.
pub struct Engine {
    config: EngineConfig,
    /// `None` while uninitialized
    pipeline: RwLock<Option<Pipeline>>,
    edge_params: RwLock<EdgeParameters>,
    stats: StatisticsTracker,
}

impl Engine {
    /// Create a new engine with the given configuration.
    ///
    /// # Returns
    /// * `Ok(Engine)` - Engine in the `Uninitialized` state
    /// * `Err(EngineError::Config)` - Thresholds or aperture rejected
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let edge_params = EdgeParameters::from(&config);
        debug!(?config, "Engine created");

        Ok(Self {
            config,
            pipeline: RwLock::new(None),
            edge_params: RwLock::new(edge_params),
            stats: StatisticsTracker::new(),
        })
    }

    /// Create an engine with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            edge_params: RwLock::new(EdgeParameters::default()),
            config: EngineConfig::default(),
            pipeline: RwLock::new(None),
            stats: StatisticsTracker::new(),
        }
    }

    /// Probe the optimized backend and move to `Ready`.
    ///
    /// Idempotent. Always succeeds: without a usable optimized backend the
    /// engine runs on the fallback strategy. Statistics restart from zero
    /// when transitioning from `Uninitialized`.
    pub fn initialize(&self) -> bool {
        if self.state() == EngineState::Ready {
            warn!("Engine already initialized");
            return true;
        }
        let strategies = StrategySet::probe(self.config.prefer_optimized);
        self.install(strategies)
    }

    /// Initialize with a caller-supplied optimized backend instead of the
    /// compiled-in one. The candidate is probed like the built-in backend.
    pub fn initialize_with_backend(&self, candidate: Box<dyn TransformBackend>) -> bool {
        if self.state() == EngineState::Ready {
            warn!("Engine already initialized");
            return true;
        }
        self.install(StrategySet::with_candidate(candidate))
    }

    fn install(&self, strategies: StrategySet) -> bool {
        let mut pipeline = self.pipeline.write();
        if pipeline.is_some() {
            return true;
        }

        let optimized = strategies.optimized_name();
        let aperture = self.config.aperture_size;
        let aperture_supported = strategies.optimized_supports_aperture(aperture);
        self.stats.reset();
        *pipeline = Some(Pipeline::new(strategies));

        match optimized {
            Some(backend) => {
                info!(backend, "Engine initialized with optimized backend");
                if !aperture_supported {
                    warn!(
                        backend,
                        aperture,
                        "Aperture not supported by optimized backend, EDGE frames use fallback"
                    );
                }
            }
            None => warn!("Engine initialized - optimized backend unavailable, using fallback"),
        }
        true
    }

    pub fn state(&self) -> EngineState {
        if self.pipeline.read().is_some() {
            EngineState::Ready
        } else {
            EngineState::Uninitialized
        }
    }

    /// Check if the engine accepts frames
    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    /// True if initialized and the optimized backend passed its probe.
    pub fn is_optimized_backend_available(&self) -> bool {
        self.pipeline
            .read()
            .as_ref()
            .is_some_and(|p| p.strategies.has_optimized())
    }

    /// Get the configuration the engine was created with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process a single RGBA frame into `output`.
    ///
    /// This is the hot path. `input` must hold at least `width * height * 4`
    /// bytes, as must `output`; only that leading region is read or written.
    /// Precondition failures return `success == false` without touching
    /// `output` or the statistics.
    pub fn process(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        mode: ProcessingMode,
        output: &mut [u8],
    ) -> ProcessingResult {
        match Frame::from_prefix(input, width, height) {
            Ok(frame) => self.process_frame(&frame, mode, output),
            Err(e) => {
                error!(width, height, error = %e, "Rejected input frame");
                ProcessingResult::failed(width, height, mode)
            }
        }
    }

    /// Process an already validated frame view.
    pub fn process_frame(
        &self,
        frame: &Frame<'_>,
        mode: ProcessingMode,
        output: &mut [u8],
    ) -> ProcessingResult {
        let (width, height) = (frame.width(), frame.height());

        let guard = self.pipeline.read();
        let Some(pipeline) = guard.as_ref() else {
            error!(error = %EngineError::NotInitialized, "Cannot process frame");
            return ProcessingResult::failed(width, height, mode);
        };

        let output = match frame.output_region(output) {
            Ok(region) => region,
            Err(e) => {
                error!(width, height, error = %e, "Rejected output buffer");
                return ProcessingResult::failed(width, height, mode);
            }
        };

        let start = Instant::now();
        let outcome = self.dispatch(pipeline, frame, mode, output);
        let elapsed = start.elapsed();

        let success = match outcome {
            Ok(Some(execution)) => {
                if execution.optimized_fault {
                    self.stats.record_backend_fault();
                }
                true
            }
            Ok(None) => true,
            Err(e) => {
                error!(%mode, error = %e, "Frame processing failed");
                false
            }
        };

        // Failed-but-measured frames still count
        self.record(elapsed, pipeline);

        ProcessingResult {
            processing_time_ms: if success {
                elapsed.as_secs_f64() * 1000.0
            } else {
                0.0
            },
            width,
            height,
            mode,
            success,
        }
    }

    fn dispatch(
        &self,
        pipeline: &Pipeline,
        frame: &Frame<'_>,
        mode: ProcessingMode,
        output: &mut [u8],
    ) -> Result<Option<Execution>> {
        match mode {
            ProcessingMode::Raw => {
                output.copy_from_slice(frame.data());
                Ok(None)
            }
            ProcessingMode::Edge => {
                let params = *self.edge_params.read();
                pipeline.edges.detect(frame, &params, output).map(Some)
            }
            ProcessingMode::Grayscale => pipeline.grayscale.convert(frame, output).map(Some),
        }
    }

    fn record(&self, elapsed: Duration, pipeline: &Pipeline) {
        let frames = self.stats.update(elapsed);
        if report_due(frames, self.config.stats_log_interval) {
            let report = StatisticsReport {
                snapshot: self.stats.snapshot(),
                optimized_available: pipeline.strategies.has_optimized(),
            };
            debug!(%report, "Statistics");
        }
    }

    /// Update the Canny thresholds used from the next EDGE frame on.
    ///
    /// The configured aperture is kept. Invalid values are rejected and the
    /// previous parameters stay in effect.
    pub fn set_edge_parameters(&self, low: f64, high: f64) -> Result<()> {
        let mut params = self.edge_params.write();
        let updated = EdgeParameters::new(low, high, params.aperture).inspect_err(|e| {
            warn!(low, high, error = %e, "Rejected edge parameters");
        })?;
        *params = updated;
        info!(low, high, "Canny thresholds updated");
        Ok(())
    }

    /// Current edge parameters
    pub fn edge_parameters(&self) -> EdgeParameters {
        *self.edge_params.read()
    }

    /// Structured statistics snapshot, readable from any thread.
    pub fn statistics(&self) -> StatisticsReport {
        StatisticsReport {
            snapshot: self.stats.snapshot(),
            optimized_available: self.is_optimized_backend_available(),
        }
    }

    /// Human-readable statistics line.
    pub fn statistics_string(&self) -> String {
        self.statistics().to_string()
    }

    /// Drop the pipeline and return to `Uninitialized`.
    ///
    /// Idempotent and safe without a prior `initialize`.
    pub fn release(&self) {
        let mut pipeline = self.pipeline.write();
        if let Some(released) = pipeline.take() {
            let report = StatisticsReport {
                snapshot: self.stats.snapshot(),
                optimized_available: released.strategies.has_optimized(),
            };
            info!(%report, "Engine released");
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.release();
    }
}
