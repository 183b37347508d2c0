//! Caller-facing analysis result.
//!
//! The serialized shape is a stable wire contract: a JSON object with
//! exactly the keys `mean_pitch`, `jitter` and `shimmer`, where an
//! undefined metric is `null`. Consumers at the service boundary forward
//! it as-is, so field names stay snake_case.

use serde::{Deserialize, Serialize};

/// The three summary statistics of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceReport {
    /// Mean of the voiced pitch values in Hz. Always defined on the
    /// success path; a signal with no detectable pitch fails the call
    /// instead of reporting a placeholder.
    pub mean_pitch: f64,
    /// Pitch perturbation in percent, `None` with fewer than two voiced
    /// frames.
    pub jitter: Option<f64>,
    /// Amplitude perturbation in percent, `None` with fewer than two
    /// finite energy values.
    pub shimmer: Option<f64>,
}
