//! Transform strategies behind one contract.
//!
//! Two implementations of [`TransformBackend`] exist:
//!
//! - **Optimized**: library-backed blur + Canny (`ImageprocBackend`, cargo
//!   feature `imageproc`), selected only if it passes a probe at
//!   initialization
//! - **Fallback**: fixed-point Sobel and grayscale (`FallbackBackend`),
//!   always available
//!
//! [`StrategySet`] runs the optimized strategy first and, if it returns an
//! error or panics, serves the same frame with the fallback.

mod fallback;
#[cfg(feature = "imageproc")]
mod optimized;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::frame::Frame;
use crate::types::{EdgeParameters, Strategy};

pub use fallback::FallbackBackend;
#[cfg(feature = "imageproc")]
pub use optimized::ImageprocBackend;

/// A set of frame transforms sharing one buffer contract.
///
/// `output` is always exactly the frame-sized RGBA region. Implementations
/// must not read from it, and should write it only once the result is
/// complete.
pub trait TransformBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Write a 4-channel edge map (R=G=B=edge, A=255).
    fn detect_edges(
        &self,
        frame: &Frame<'_>,
        params: &EdgeParameters,
        output: &mut [u8],
    ) -> Result<()>;

    /// Write a 4-channel grayscale image (R=G=B=luma, A=255).
    fn to_grayscale(&self, frame: &Frame<'_>, output: &mut [u8]) -> Result<()>;

    /// Whether `detect_edges` can honour this Sobel aperture.
    fn supports_aperture(&self, _aperture: u32) -> bool {
        true
    }

    /// Verify the backend works before it is selected.
    fn probe(&self) -> Result<()> {
        Ok(())
    }
}

/// How a strategy-backed call was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    pub strategy: Strategy,
    /// The optimized strategy was tried and failed on this frame
    pub optimized_fault: bool,
}

/// Run a backend call, converting a panic into [`EngineError::Backend`].
pub(crate) fn guarded<F>(backend: &'static str, op: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(result) => result,
        Err(payload) => Err(EngineError::Backend(format!(
            "{} panicked: {}",
            backend,
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(feature = "imageproc")]
fn compiled_candidate() -> Option<Box<dyn TransformBackend>> {
    Some(Box::new(ImageprocBackend::new()))
}

#[cfg(not(feature = "imageproc"))]
fn compiled_candidate() -> Option<Box<dyn TransformBackend>> {
    None
}

/// Optimized strategy (if usable) plus the always-available fallback.
pub struct StrategySet {
    optimized: Option<Box<dyn TransformBackend>>,
    fallback: FallbackBackend,
}

impl StrategySet {
    /// Build a set that only ever uses the fallback.
    pub fn fallback_only() -> Self {
        Self {
            optimized: None,
            fallback: FallbackBackend,
        }
    }

    /// Build a set with an explicit optimized candidate, keeping it only if
    /// its probe passes.
    pub fn with_candidate(candidate: Box<dyn TransformBackend>) -> Self {
        let name = candidate.name();
        match guarded(name, || candidate.probe()) {
            Ok(()) => {
                info!(backend = name, "Optimized backend available");
                Self {
                    optimized: Some(candidate),
                    fallback: FallbackBackend,
                }
            }
            Err(e) => {
                warn!(backend = name, error = %e, "Optimized backend probe failed, using fallback");
                Self::fallback_only()
            }
        }
    }

    /// Probe the compiled-in optimized backend.
    pub fn probe(prefer_optimized: bool) -> Self {
        if !prefer_optimized {
            info!("Optimized backend disabled by configuration");
            return Self::fallback_only();
        }

        match compiled_candidate() {
            Some(candidate) => Self::with_candidate(candidate),
            None => {
                warn!("Optimized backend not compiled in - using fallback implementation");
                Self::fallback_only()
            }
        }
    }

    pub fn has_optimized(&self) -> bool {
        self.optimized.is_some()
    }

    pub fn optimized_name(&self) -> Option<&'static str> {
        self.optimized.as_ref().map(|b| b.name())
    }

    /// True if the optimized strategy can serve edge maps with `aperture`.
    pub fn optimized_supports_aperture(&self, aperture: u32) -> bool {
        self.optimized
            .as_deref()
            .is_some_and(|b| b.supports_aperture(aperture))
    }

    /// Run `op` on the optimized strategy, retrying the same frame on the
    /// fallback if it fails.
    pub fn execute<F>(&self, operation: &'static str, output: &mut [u8], op: F) -> Result<Execution>
    where
        F: Fn(&dyn TransformBackend, &mut [u8]) -> Result<()>,
    {
        self.execute_where(operation, |_| true, output, op)
    }

    /// Like [`StrategySet::execute`], but goes straight to the fallback when
    /// `eligible` rejects the optimized strategy. A skip is not a fault.
    pub fn execute_where<E, F>(
        &self,
        operation: &'static str,
        eligible: E,
        output: &mut [u8],
        op: F,
    ) -> Result<Execution>
    where
        E: Fn(&dyn TransformBackend) -> bool,
        F: Fn(&dyn TransformBackend, &mut [u8]) -> Result<()>,
    {
        let mut optimized_fault = false;

        if let Some(optimized) = self.optimized.as_deref().filter(|b| eligible(*b)) {
            match guarded(optimized.name(), || op(optimized, &mut *output)) {
                Ok(()) => {
                    return Ok(Execution {
                        strategy: Strategy::Optimized,
                        optimized_fault,
                    })
                }
                Err(e) => {
                    warn!(
                        backend = optimized.name(),
                        operation,
                        error = %e,
                        "Optimized backend failed, retrying frame with fallback"
                    );
                    optimized_fault = true;
                }
            }
        }

        guarded(self.fallback.name(), || op(&self.fallback, &mut *output))?;
        Ok(Execution {
            strategy: Strategy::Fallback,
            optimized_fault,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that fails every call, by error or by panic.
    struct FaultyBackend {
        panic: bool,
        probe_ok: bool,
    }

    impl FaultyBackend {
        fn fail(&self) -> Result<()> {
            if self.panic {
                panic!("simulated backend crash");
            }
            Err(EngineError::Backend("simulated failure".to_string()))
        }
    }

    impl TransformBackend for FaultyBackend {
        fn name(&self) -> &'static str {
            "faulty"
        }

        fn detect_edges(
            &self,
            _frame: &Frame<'_>,
            _params: &EdgeParameters,
            _output: &mut [u8],
        ) -> Result<()> {
            self.fail()
        }

        fn to_grayscale(&self, _frame: &Frame<'_>, _output: &mut [u8]) -> Result<()> {
            self.fail()
        }

        fn probe(&self) -> Result<()> {
            if self.probe_ok {
                Ok(())
            } else {
                self.fail()
            }
        }
    }

    fn faulty_set(panic: bool) -> StrategySet {
        StrategySet::with_candidate(Box::new(FaultyBackend {
            panic,
            probe_ok: true,
        }))
    }

    #[test]
    fn test_guarded_converts_panic() {
        let err = guarded("test", || panic!("boom")).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_failed_probe_drops_candidate() {
        let set = StrategySet::with_candidate(Box::new(FaultyBackend {
            panic: true,
            probe_ok: false,
        }));
        assert!(!set.has_optimized());
    }

    #[test]
    fn test_error_falls_back_for_same_frame() {
        let set = faulty_set(false);
        assert_eq!(set.optimized_name(), Some("faulty"));

        let data = [100u8, 150, 200, 255];
        let frame = Frame::new(&data, 1, 1).unwrap();
        let mut out = [0u8; 4];
        let exec = set
            .execute("grayscale", &mut out, |b, o| b.to_grayscale(&frame, o))
            .unwrap();

        assert_eq!(exec.strategy, Strategy::Fallback);
        assert!(exec.optimized_fault);
        assert_eq!(out, [140, 140, 140, 255]);
    }

    #[test]
    fn test_panic_falls_back_for_same_frame() {
        let set = faulty_set(true);
        let data = [0u8; 3 * 3 * 4];
        let frame = Frame::new(&data, 3, 3).unwrap();
        let params = EdgeParameters::default();
        let mut out = [9u8; 3 * 3 * 4];
        let exec = set
            .execute("edge", &mut out, |b, o| b.detect_edges(&frame, &params, o))
            .unwrap();

        assert_eq!(exec.strategy, Strategy::Fallback);
        assert!(exec.optimized_fault);
        assert!(out.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn test_ineligible_optimized_is_skipped_without_fault() {
        let set = faulty_set(false);
        let data = [100u8, 150, 200, 255];
        let frame = Frame::new(&data, 1, 1).unwrap();
        let mut out = [0u8; 4];
        let exec = set
            .execute_where("grayscale", |_| false, &mut out, |b, o| {
                b.to_grayscale(&frame, o)
            })
            .unwrap();

        assert_eq!(exec.strategy, Strategy::Fallback);
        assert!(!exec.optimized_fault);
        assert_eq!(out, [140, 140, 140, 255]);
    }

    #[test]
    fn test_optimized_supports_aperture() {
        assert!(faulty_set(false).optimized_supports_aperture(5));
        assert!(!StrategySet::fallback_only().optimized_supports_aperture(3));
    }

    #[test]
    fn test_fallback_only_never_faults() {
        let set = StrategySet::fallback_only();
        let data = [1u8; 4];
        let frame = Frame::new(&data, 1, 1).unwrap();
        let mut out = [0u8; 4];
        let exec = set
            .execute("grayscale", &mut out, |b, o| b.to_grayscale(&frame, o))
            .unwrap();
        assert_eq!(
            exec,
            Execution {
                strategy: Strategy::Fallback,
                optimized_fault: false
            }
        );
    }
}
