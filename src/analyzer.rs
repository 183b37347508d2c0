//! `VoiceAnalyzer` — top-level analysis facade.
//!
//! ## Pipeline
//!
//! ```text
//! Signal ──► Framer ──► PitchEstimator ──► PitchContour ──┐
//!              │                                          ├──► VoiceReport
//!              └──► energy_contour ──────► EnergyContour ─┘
//! ```
//!
//! Data flows strictly forward; one `analyze` call validates, runs every
//! stage, and returns. The analyzer owns nothing but its configuration
//! and the estimator's scratch buffers, so independent callers each hold
//! their own analyzer and need no coordination.

use tracing::{debug, info, warn};

use crate::energy::energy_contour;
use crate::error::{Result, VocalisError};
use crate::framing::{Framer, TailPolicy};
use crate::perturbation::{jitter_percent, mean_pitch, shimmer_percent};
use crate::pitch::{PitchEstimator, PyinEstimator};
use crate::report::VoiceReport;
use crate::signal::Signal;

use serde::{Deserialize, Serialize};

/// Sample rate the upstream decoder contract promises (Hz).
pub const NOMINAL_SAMPLE_RATE: u32 = 16_000;

/// Configuration for `VoiceAnalyzer`, validated at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Lowest fundamental considered, in Hz. Default: 50.0.
    pub fmin: f64,
    /// Highest fundamental considered, in Hz. Default: 500.0.
    pub fmax: f64,
    /// Analysis window in samples. Default: 2048 (128 ms at 16 kHz).
    pub frame_length: usize,
    /// Hop between consecutive frames in samples. Default: 512.
    pub hop_length: usize,
    /// Handling of the last partial frame. Default: `ZeroPad`.
    pub tail_policy: TailPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fmin: 50.0,
            fmax: 500.0,
            frame_length: 2048,
            hop_length: 512,
            tail_policy: TailPolicy::ZeroPad,
        }
    }
}

/// The top-level analysis handle.
///
/// Holds no cross-call state: analyzing the same buffer twice returns the
/// same report. For parallel analyses, give each thread its own analyzer.
pub struct VoiceAnalyzer {
    config: AnalyzerConfig,
    estimator: Box<dyn PitchEstimator>,
}

impl VoiceAnalyzer {
    /// Create an analyzer with the default probabilistic YIN tracker
    /// configured for `config`'s frequency range.
    pub fn new(config: AnalyzerConfig) -> Self {
        let estimator = Box::new(PyinEstimator::new(config.fmin, config.fmax));
        Self { config, estimator }
    }

    /// Create an analyzer around a caller-supplied tracker.
    ///
    /// The estimator owns its own tuning; `config`'s `fmin`/`fmax` still
    /// bound the validation below.
    pub fn with_estimator(config: AnalyzerConfig, estimator: Box<dyn PitchEstimator>) -> Self {
        Self { config, estimator }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Run the full pipeline over one signal.
    ///
    /// # Errors
    /// - `EmptySignal` / `InvalidConfig` for rejected input.
    /// - `NoFrames` when the framer yields nothing (short signal under
    ///   `TailPolicy::Drop`).
    /// - `NoPitchDetected` when no frame is voiced; undefined jitter or
    ///   shimmer are *not* errors, they come back as `None` fields.
    pub fn analyze(&mut self, signal: &Signal) -> Result<VoiceReport> {
        self.validate(signal)?;
        if signal.sample_rate != NOMINAL_SAMPLE_RATE {
            warn!(
                sample_rate = signal.sample_rate,
                nominal = NOMINAL_SAMPLE_RATE,
                "sample rate differs from the decoder contract"
            );
        }

        let framer = Framer::new(
            self.config.frame_length,
            self.config.hop_length,
            self.config.tail_policy,
        )?;
        let n_frames = framer.frame_count(signal.samples.len());
        if n_frames == 0 {
            return Err(VocalisError::NoFrames);
        }
        debug!(
            samples = signal.samples.len(),
            frames = n_frames,
            "framing ready"
        );

        let pitch = self.estimator.track(signal, &framer);
        if pitch.len() != n_frames {
            warn!(
                expected = n_frames,
                got = pitch.len(),
                "estimator contour does not match the frame grid"
            );
        }
        let energy = energy_contour(signal, &framer);

        let mean = mean_pitch(&pitch).ok_or(VocalisError::NoPitchDetected)?;
        let jitter = jitter_percent(&pitch);
        let shimmer = shimmer_percent(&energy);
        info!(
            voiced = pitch.voiced_count(),
            frames = n_frames,
            mean_pitch = mean,
            jitter = ?jitter,
            shimmer = ?shimmer,
            "analysis complete"
        );
        Ok(VoiceReport {
            mean_pitch: mean,
            jitter,
            shimmer,
        })
    }

    // ── Internal helpers ────────────────────────────────────────────────

    fn validate(&self, signal: &Signal) -> Result<()> {
        let cfg = &self.config;
        if signal.is_empty() {
            return Err(VocalisError::EmptySignal);
        }
        if signal.sample_rate == 0 {
            return Err(VocalisError::InvalidConfig(
                "sample rate must be positive".into(),
            ));
        }
        if cfg.frame_length == 0 {
            return Err(VocalisError::InvalidConfig(
                "frame_length must be positive".into(),
            ));
        }
        if cfg.hop_length == 0 {
            return Err(VocalisError::InvalidConfig(
                "hop_length must be positive".into(),
            ));
        }
        if !cfg.fmin.is_finite() || !cfg.fmax.is_finite() {
            return Err(VocalisError::InvalidConfig(
                "fmin and fmax must be finite".into(),
            ));
        }
        if cfg.fmin <= 0.0 {
            return Err(VocalisError::InvalidConfig(format!(
                "fmin must be positive, got {}",
                cfg.fmin
            )));
        }
        if cfg.fmin >= cfg.fmax {
            return Err(VocalisError::InvalidConfig(format!(
                "fmin ({}) must be below fmax ({})",
                cfg.fmin, cfg.fmax
            )));
        }
        let nyquist = f64::from(signal.sample_rate) / 2.0;
        if cfg.fmax > nyquist {
            return Err(VocalisError::InvalidConfig(format!(
                "fmax ({} Hz) exceeds the Nyquist limit ({} Hz)",
                cfg.fmax, nyquist
            )));
        }
        let lag_max = (f64::from(signal.sample_rate) / cfg.fmin).floor() as usize;
        if cfg.frame_length < 2 * lag_max {
            return Err(VocalisError::InvalidConfig(format!(
                "frame_length {} cannot resolve fmin {} Hz at {} Hz (needs at least {})",
                cfg.frame_length,
                cfg.fmin,
                signal.sample_rate,
                2 * lag_max
            )));
        }
        Ok(())
    }
}
