//! `McLeodEstimator` — frame-local McLeod pitch method.
//!
//! Wraps the `pitch-detection` crate's McLeod detector: normalized square
//! difference per frame, peak picking with clarity and power gates. No
//! temporal smoothing, so it is cheaper than the default tracker and
//! useful where per-frame independence is wanted, at the cost of more
//! isolated voicing errors on marginal audio.
//!
//! Unlike the CMND-based tracker, the power gate here is absolute: a very
//! quiet but clean tone below the gate reads as unvoiced.

use pitch_detection::detector::mcleod::McLeodDetector;
use pitch_detection::detector::PitchDetector;
use tracing::debug;

use super::{PitchContour, PitchEstimator};
use crate::framing::Framer;
use crate::signal::Signal;

/// Total frame energy (sum of squares) below which detection is skipped.
const POWER_THRESHOLD: f32 = 0.8;

/// Minimum NSDF peak clarity for a frame to count as voiced.
const CLARITY_THRESHOLD: f32 = 0.5;

/// Frame-local McLeod pitch estimator.
#[derive(Debug, Clone)]
pub struct McLeodEstimator {
    fmin: f64,
    fmax: f64,
    frame: Vec<f32>,
}

impl McLeodEstimator {
    /// Create an estimator for the given frequency search range.
    ///
    /// Detections outside `[fmin, fmax]` are reported as unvoiced.
    pub fn new(fmin: f64, fmax: f64) -> Self {
        Self {
            fmin,
            fmax,
            frame: Vec::new(),
        }
    }
}

impl Default for McLeodEstimator {
    fn default() -> Self {
        Self::new(50.0, 500.0)
    }
}

impl PitchEstimator for McLeodEstimator {
    fn track(&mut self, signal: &Signal, framer: &Framer) -> PitchContour {
        let n_frames = framer.frame_count(signal.samples.len());
        if n_frames == 0 {
            return PitchContour::new(Vec::new());
        }

        // The detector is sized to the frame; one instance serves the call.
        let mut detector = McLeodDetector::new(framer.frame_length(), framer.frame_length() / 2);
        let sample_rate = signal.sample_rate as usize;

        let mut entries = Vec::with_capacity(n_frames);
        for i in 0..n_frames {
            framer.fill_frame(&signal.samples, i, &mut self.frame);
            let entry = detector
                .get_pitch(&self.frame, sample_rate, POWER_THRESHOLD, CLARITY_THRESHOLD)
                .map(|p| f64::from(p.frequency))
                .filter(|&hz| hz >= self.fmin && hz <= self.fmax);
            entries.push(entry);
        }

        let contour = PitchContour::new(entries);
        debug!(
            frames = contour.len(),
            voiced = contour.voiced_count(),
            "mcleod tracking complete"
        );
        contour
    }
}
