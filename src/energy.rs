//! Per-frame RMS energy contour.
//!
//! Computed for every frame on the grid regardless of the pitch tracker's
//! voicing decision: jitter is restricted to voiced frames, shimmer is not.
//! That asymmetry is part of the analyzer's contract, not an oversight.

use tracing::debug;

use crate::framing::Framer;
use crate::signal::Signal;

/// One non-negative RMS value per frame, aligned with the frame grid.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyContour {
    values: Vec<f64>,
}

impl EnergyContour {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Compute the root-mean-square of a sample slice.
///
/// Accumulates in f64 so long frames of small samples do not lose
/// precision. An empty slice has zero energy.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// RMS per frame over the framer's grid.
pub fn energy_contour(signal: &Signal, framer: &Framer) -> EnergyContour {
    let n_frames = framer.frame_count(signal.samples.len());
    let mut values = Vec::with_capacity(n_frames);
    let mut frame = Vec::with_capacity(framer.frame_length());
    for i in 0..n_frames {
        framer.fill_frame(&signal.samples, i, &mut frame);
        values.push(rms(&frame));
    }
    debug!(frames = values.len(), "energy contour computed");
    EnergyContour::new(values)
}
