//! Pitch tracking abstraction.
//!
//! The `PitchEstimator` trait is the primary extensibility point: swap in
//! `PyinEstimator` (default), `McLeodEstimator`, or any future tracker
//! without touching the aggregation math.

pub mod mcleod;
pub mod pyin;

pub use mcleod::McLeodEstimator;
pub use pyin::PyinEstimator;

use crate::framing::Framer;
use crate::signal::Signal;

/// One entry per frame: `Some(hz)` when voiced, `None` when unvoiced or
/// undetermined.
///
/// The tagged entry keeps "no pitch" type-distinct from any numeric value,
/// so a 0 Hz reading can never be mistaken for an unvoiced frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchContour {
    entries: Vec<Option<f64>>,
}

impl PitchContour {
    pub fn new(entries: Vec<Option<f64>>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Option<f64>] {
        &self.entries
    }

    /// Voiced values in frame order, markers skipped.
    pub fn voiced(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().filter_map(|e| *e)
    }

    pub fn voiced_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

/// Trait for all pitch tracker implementations.
///
/// Implementors may hold scratch buffers (hence `&mut self`) but must not
/// carry state across calls: tracking the same signal twice returns the
/// same contour.
pub trait PitchEstimator: Send {
    /// Estimate one contour entry per frame of `framer`'s grid over `signal`.
    ///
    /// A signal with no detectable voicing yields an all-`None` contour,
    /// never an error; the caller decides what that means.
    fn track(&mut self, signal: &Signal, framer: &Framer) -> PitchContour;
}
