//! Perturbation statistics: mean pitch, jitter, shimmer.
//!
//! Jitter and shimmer share one primitive: the mean absolute consecutive
//! difference of a cleaned sequence, normalized by the sequence's single
//! overall mean, times 100. The divisor is computed once over the whole
//! sequence, not per pair.
//!
//! Cleaning removes unvoiced markers (jitter) and non-finite entries
//! (both) *before* differencing, so retained neighbors are treated as
//! consecutive even when frames between them were dropped. A long
//! unvoiced gap therefore contributes a single difference, which can
//! understate instability across the gap. That is the documented,
//! contract-level behavior; tests pin it.

use crate::energy::EnergyContour;
use crate::pitch::PitchContour;

/// Mean absolute consecutive difference over `values`, as a percentage of
/// the overall mean.
///
/// Returns `None` for fewer than two values, or when the mean is zero
/// (the ratio has no meaning for an all-zero sequence). Callers pass
/// already-cleaned sequences; no filtering happens here.
pub fn relative_perturbation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean == 0.0 {
        return None;
    }
    let abs_diff_sum: f64 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    let mean_abs_diff = abs_diff_sum / (values.len() - 1) as f64;
    Some(100.0 * mean_abs_diff / mean)
}

/// Arithmetic mean of the voiced pitch values, markers ignored.
///
/// `None` when no voiced frame exists; the analyzer turns that into its
/// hard no-pitch failure.
pub fn mean_pitch(contour: &PitchContour) -> Option<f64> {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for hz in contour.voiced().filter(|hz| hz.is_finite()) {
        sum += hz;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Jitter (%): relative perturbation of the voiced pitch sequence.
pub fn jitter_percent(contour: &PitchContour) -> Option<f64> {
    let voiced: Vec<f64> = contour.voiced().filter(|hz| hz.is_finite()).collect();
    relative_perturbation(&voiced)
}

/// Shimmer (%): relative perturbation of the energy contour.
///
/// Computed over every frame regardless of voicing; only non-finite
/// entries are removed.
pub fn shimmer_percent(energy: &EnergyContour) -> Option<f64> {
    let finite: Vec<f64> = energy
        .values()
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    relative_perturbation(&finite)
}
