//! `PyinEstimator` — probabilistic YIN pitch tracker (default).
//!
//! ## Algorithm
//!
//! Per frame:
//! 1. Squared-difference function over candidate lags `sr/fmax ..= sr/fmin`.
//! 2. Cumulative-mean normalization (CMND) into a per-lag aperiodicity
//!    score in which deep troughs mark candidate periods.
//! 3. A distribution of absolute thresholds (Beta-weighted grid) assigns
//!    each trough a probability: each threshold votes for the first trough
//!    below it, so several candidate periods can carry mass and the total
//!    mass doubles as the frame's voicing probability.
//! 4. Parabolic interpolation around each trough refines the period to
//!    sub-sample precision.
//!
//! Across frames, a Viterbi pass over {candidates + unvoiced} picks the
//! cheapest path, charging for octave jumps and voicing flips. This is what
//! suppresses isolated false voicing and octave errors that single-frame
//! estimation is prone to, and which jitter downstream would amplify.

use tracing::{debug, warn};

use super::{PitchContour, PitchEstimator};
use crate::framing::Framer;
use crate::signal::Signal;

/// Number of points in the absolute-threshold grid over (0, 1].
const N_THRESHOLDS: usize = 100;

/// Beta distribution shape for the threshold prior (mean 0.1).
const BETA_ALPHA: f64 = 2.0;
const BETA_BETA: f64 = 18.0;

/// Mass given to the global-minimum trough when no trough clears a
/// threshold. Keeps a weakly periodic frame reachable for Viterbi instead
/// of hard-zeroing it.
const NO_TROUGH_PROB: f64 = 0.01;

/// Transition cost per octave between voiced frames.
const OCTAVE_JUMP_COST: f64 = 0.35;

/// Transition cost for a voiced/unvoiced flip.
const VOICED_UNVOICED_COST: f64 = 0.14;

/// Transition costs are defined per 10 ms of hop; scaled to the actual hop.
const COST_REFERENCE_STEP: f64 = 0.01;

/// Keep at most this many candidates per frame.
const MAX_CANDIDATES: usize = 8;

/// Mean-square floor below which a frame is silent and gets no candidates.
const SILENCE_GATE: f64 = 1e-10;

/// One Viterbi state: a candidate period or the unvoiced state.
///
/// `frequency == 0.0` marks the unvoiced state; its strength is the
/// probability mass the troughs did not claim.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    frequency: f64,
    strength: f64,
}

/// Probabilistic YIN estimator with Viterbi smoothing.
#[derive(Debug, Clone)]
pub struct PyinEstimator {
    fmin: f64,
    fmax: f64,
    thresholds: Vec<f64>,
    weights: Vec<f64>,
    // Scratch reused across frames
    frame: Vec<f32>,
    diff: Vec<f64>,
    cmnd: Vec<f64>,
}

impl PyinEstimator {
    /// Create an estimator for the given frequency search range.
    ///
    /// # Parameters
    /// - `fmin`: lowest detectable fundamental in Hz. Default: `50.0`.
    /// - `fmax`: highest detectable fundamental in Hz. Default: `500.0`.
    pub fn new(fmin: f64, fmax: f64) -> Self {
        let mut thresholds = Vec::with_capacity(N_THRESHOLDS);
        let mut weights = Vec::with_capacity(N_THRESHOLDS);
        for k in 1..=N_THRESHOLDS {
            let t = k as f64 / N_THRESHOLDS as f64;
            thresholds.push(t);
            weights.push(t.powf(BETA_ALPHA - 1.0) * (1.0 - t).powf(BETA_BETA - 1.0));
        }
        let total: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= total;
        }
        Self {
            fmin,
            fmax,
            thresholds,
            weights,
            frame: Vec::new(),
            diff: Vec::new(),
            cmnd: Vec::new(),
        }
    }

    /// Score one frame (already in `self.frame`) into Viterbi states.
    fn frame_states(&mut self, sr: f64, lag_min: usize, lag_max: usize) -> Vec<Candidate> {
        let unvoiced_only = vec![Candidate {
            frequency: 0.0,
            strength: 1.0,
        }];

        if mean_square(&self.frame) < SILENCE_GATE {
            return unvoiced_only;
        }

        difference_function(&self.frame, lag_max + 1, &mut self.diff);
        cumulative_mean_normalize(&self.diff, &mut self.cmnd);
        let troughs = find_troughs(&self.cmnd, lag_min, lag_max);
        if troughs.is_empty() {
            return unvoiced_only;
        }

        // Each threshold votes for the first (shortest-lag) trough below it;
        // thresholds no trough clears give a vestige to the global minimum.
        let mut probs = vec![0.0f64; troughs.len()];
        let global_min = troughs
            .iter()
            .enumerate()
            .min_by(|(_, &a), (_, &b)| self.cmnd[a].total_cmp(&self.cmnd[b]))
            .map(|(i, _)| i)
            .unwrap_or(0);
        for (t, w) in self.thresholds.iter().zip(&self.weights) {
            match troughs.iter().position(|&tau| self.cmnd[tau] < *t) {
                Some(first) => probs[first] += w,
                None => probs[global_min] += w * NO_TROUGH_PROB,
            }
        }

        let mut scored: Vec<(usize, f64)> = troughs
            .iter()
            .copied()
            .zip(probs)
            .filter(|&(_, p)| p > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(MAX_CANDIDATES);

        let voiced_prob: f64 = scored.iter().map(|&(_, p)| p).sum();
        let mut states = Vec::with_capacity(scored.len() + 1);
        states.push(Candidate {
            frequency: 0.0,
            strength: (1.0 - voiced_prob).max(0.0),
        });
        for (tau, p) in scored {
            let period = refine_period(&self.cmnd, tau);
            states.push(Candidate {
                frequency: sr / period,
                strength: p,
            });
        }
        states
    }
}

impl Default for PyinEstimator {
    fn default() -> Self {
        Self::new(50.0, 500.0)
    }
}

impl PitchEstimator for PyinEstimator {
    fn track(&mut self, signal: &Signal, framer: &Framer) -> PitchContour {
        let n_frames = framer.frame_count(signal.samples.len());
        if n_frames == 0 {
            return PitchContour::new(Vec::new());
        }

        let sr = f64::from(signal.sample_rate);
        let lag_min = ((sr / self.fmax).ceil() as usize).max(2);
        let lag_max = ((sr / self.fmin).floor() as usize).min(framer.frame_length() / 2);
        if lag_min >= lag_max {
            warn!(
                lag_min,
                lag_max, "degenerate lag range, emitting all-unvoiced contour"
            );
            return PitchContour::new(vec![None; n_frames]);
        }

        let mut states = Vec::with_capacity(n_frames);
        for i in 0..n_frames {
            framer.fill_frame(&signal.samples, i, &mut self.frame);
            states.push(self.frame_states(sr, lag_min, lag_max));
        }

        let time_step = framer.hop_length() as f64 / sr;
        let path = viterbi_select(&states, time_step);

        let entries: Vec<Option<f64>> = path
            .iter()
            .enumerate()
            .map(|(i, &j)| {
                let chosen = states[i][j];
                (chosen.frequency > 0.0).then_some(chosen.frequency)
            })
            .collect();

        let contour = PitchContour::new(entries);
        debug!(
            frames = contour.len(),
            voiced = contour.voiced_count(),
            lag_min,
            lag_max,
            "pyin tracking complete"
        );
        contour
    }
}

fn mean_square(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f64 = frame.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    sum / frame.len() as f64
}

/// YIN squared-difference function `d(tau)` for `tau` in `0..=lag_max`.
///
/// Uses a fixed correlation window of `frame.len() - lag_max` samples so
/// values are comparable across lags. Accumulates in f64.
fn difference_function(frame: &[f32], lag_max: usize, out: &mut Vec<f64>) {
    let window = frame.len() - lag_max;
    out.clear();
    out.resize(lag_max + 1, 0.0);
    for tau in 1..=lag_max {
        let mut sum = 0.0f64;
        for i in 0..window {
            let d = f64::from(frame[i]) - f64::from(frame[i + tau]);
            sum += d * d;
        }
        out[tau] = sum;
    }
}

/// Cumulative-mean-normalized difference: `d'(tau) = d(tau) * tau / sum(d(1..=tau))`.
///
/// `d'(0) = 1` by definition. A frame with no difference energy anywhere
/// (silence, DC) normalizes to a flat 1.0 curve, which has no troughs.
fn cumulative_mean_normalize(diff: &[f64], out: &mut Vec<f64>) {
    out.clear();
    out.resize(diff.len(), 1.0);
    let mut running = 0.0f64;
    for tau in 1..diff.len() {
        running += diff[tau];
        if running > 0.0 {
            out[tau] = diff[tau] * tau as f64 / running;
        }
    }
}

/// Strict local minima of `cmnd` with lag in `lag_min..=lag_max`.
///
/// Requires `lag_min >= 2` and `cmnd` computed through `lag_max + 1` so
/// every candidate has both neighbors. Strictness matters: a flat curve
/// (silence) must produce no troughs.
fn find_troughs(cmnd: &[f64], lag_min: usize, lag_max: usize) -> Vec<usize> {
    let mut troughs = Vec::new();
    for tau in lag_min..=lag_max {
        if cmnd[tau] < cmnd[tau - 1] && cmnd[tau] < cmnd[tau + 1] {
            troughs.push(tau);
        }
    }
    troughs
}

/// Parabolic interpolation through the trough and its neighbors, returning
/// a sub-sample period estimate clamped to ±0.5 of the integer lag.
fn refine_period(cmnd: &[f64], tau: usize) -> f64 {
    let a = cmnd[tau - 1];
    let b = cmnd[tau];
    let c = cmnd[tau + 1];
    let denom = a - 2.0 * b + c;
    let shift = if denom.abs() > 1e-12 {
        ((a - c) / (2.0 * denom)).clamp(-0.5, 0.5)
    } else {
        0.0
    };
    tau as f64 + shift
}

fn transition_cost(f_prev: f64, f_next: f64) -> f64 {
    if f_prev == 0.0 && f_next == 0.0 {
        0.0
    } else if f_prev == 0.0 || f_next == 0.0 {
        VOICED_UNVOICED_COST
    } else {
        OCTAVE_JUMP_COST * (f_next / f_prev).log2().abs()
    }
}

/// Minimum-cost path through the per-frame state sets.
///
/// Local cost is negative strength; transition costs are scaled by
/// `COST_REFERENCE_STEP / time_step` so the penalty per second of audio is
/// independent of the hop.
fn viterbi_select(states: &[Vec<Candidate>], time_step: f64) -> Vec<usize> {
    let n = states.len();
    let correction = if time_step > 0.0 {
        COST_REFERENCE_STEP / time_step
    } else {
        1.0
    };

    let mut cost: Vec<Vec<f64>> = states
        .iter()
        .map(|f| vec![f64::INFINITY; f.len()])
        .collect();
    let mut prev: Vec<Vec<usize>> = states.iter().map(|f| vec![0usize; f.len()]).collect();

    for (j, cand) in states[0].iter().enumerate() {
        cost[0][j] = -cand.strength;
    }

    for i in 1..n {
        for j in 0..states[i].len() {
            let next = states[i][j];
            for k in 0..states[i - 1].len() {
                let here = states[i - 1][k];
                let trans = transition_cost(here.frequency, next.frequency) * correction;
                let total = cost[i - 1][k] + trans - next.strength;
                if total < cost[i][j] {
                    cost[i][j] = total;
                    prev[i][j] = k;
                }
            }
        }
    }

    let mut path = vec![0usize; n];
    path[n - 1] = cost[n - 1]
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(j, _)| j)
        .unwrap_or(0);
    for i in (0..n - 1).rev() {
        path[i] = prev[i + 1][path[i + 1]];
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::TailPolicy;

    fn sine_signal(freq: f64, amplitude: f32, secs: f64, sr: u32) -> Signal {
        let n = (secs * f64::from(sr)) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                amplitude
                    * (2.0 * std::f64::consts::PI * freq * i as f64 / f64::from(sr)).sin() as f32
            })
            .collect();
        Signal::new(samples, sr)
    }

    fn default_framer() -> Framer {
        Framer::new(2048, 512, TailPolicy::ZeroPad).unwrap()
    }

    #[test]
    fn threshold_weights_sum_to_one() {
        let est = PyinEstimator::default();
        let total: f64 = est.weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(est.thresholds.len(), N_THRESHOLDS);
    }

    #[test]
    fn difference_function_dips_at_the_period() {
        let signal = sine_signal(220.0, 0.5, 0.2, 16_000);
        let mut diff = Vec::new();
        difference_function(&signal.samples[..2048], 321, &mut diff);
        // 16000 / 220 = 72.7. The raw difference dips at every multiple of
        // the period too, so search only up to the first dip's neighborhood.
        let (argmin, _) = diff[32..=100]
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .unwrap();
        let lag = argmin + 32;
        assert!((72..=73).contains(&lag), "lag={lag}");
    }

    #[test]
    fn first_deep_cmnd_trough_is_the_period_not_a_multiple() {
        // The raw difference can be even deeper at 2x, 3x, 4x the period
        // when a multiple aligns better with the sample grid; the
        // first-trough-below-threshold rule is what makes the period win.
        let signal = sine_signal(220.0, 0.5, 0.2, 16_000);
        let mut diff = Vec::new();
        let mut cmnd = Vec::new();
        difference_function(&signal.samples[..2048], 321, &mut diff);
        cumulative_mean_normalize(&diff, &mut cmnd);
        let troughs = find_troughs(&cmnd, 32, 320);
        let first_deep = troughs
            .iter()
            .copied()
            .find(|&tau| cmnd[tau] < 0.1)
            .unwrap();
        assert!((72..=73).contains(&first_deep), "first_deep={first_deep}");
    }

    #[test]
    fn cmnd_of_silence_is_flat_and_troughless() {
        let frame = vec![0.0f32; 2048];
        let mut diff = Vec::new();
        let mut cmnd = Vec::new();
        difference_function(&frame, 321, &mut diff);
        cumulative_mean_normalize(&diff, &mut cmnd);
        assert!(cmnd.iter().all(|&v| v == 1.0));
        assert!(find_troughs(&cmnd, 32, 320).is_empty());
    }

    #[test]
    fn find_troughs_requires_strict_minima() {
        let cmnd = vec![1.0, 1.0, 0.9, 0.5, 0.7, 0.3, 0.8];
        assert_eq!(find_troughs(&cmnd, 2, 5), vec![3, 5]);
        // A plateau is not a trough
        let flat = vec![1.0, 0.5, 0.5, 0.5, 1.0, 1.0];
        assert!(find_troughs(&flat, 2, 4).is_empty());
    }

    #[test]
    fn refine_period_recovers_a_fractional_vertex() {
        // Parabola with vertex at 4.3
        let curve: Vec<f64> = (0..8).map(|i| (i as f64 - 4.3).powi(2)).collect();
        let period = refine_period(&curve, 4);
        assert!((period - 4.3).abs() < 1e-9, "period={period}");
    }

    #[test]
    fn tracks_a_steady_sine_as_voiced() {
        let signal = sine_signal(220.0, 0.5, 1.0, 16_000);
        let mut est = PyinEstimator::default();
        let contour = est.track(&signal, &default_framer());
        assert_eq!(contour.len(), 29);
        assert_eq!(contour.voiced_count(), contour.len());
        for hz in contour.voiced() {
            assert!((218.0..=222.0).contains(&hz), "hz={hz}");
        }
    }

    #[test]
    fn amplitude_does_not_change_the_voicing_decision() {
        // CMND is amplitude-invariant: a very quiet but clean sine is voiced
        let signal = sine_signal(220.0, 1e-3, 0.5, 16_000);
        let mut est = PyinEstimator::default();
        let contour = est.track(&signal, &default_framer());
        assert!(contour.voiced_count() > 0);
        for hz in contour.voiced() {
            assert!((218.0..=222.0).contains(&hz), "hz={hz}");
        }
    }

    #[test]
    fn silence_is_entirely_unvoiced() {
        let signal = Signal::new(vec![0.0f32; 16_000], 16_000);
        let mut est = PyinEstimator::default();
        let contour = est.track(&signal, &default_framer());
        assert_eq!(contour.voiced_count(), 0);
        assert_eq!(contour.len(), 29);
    }

    #[test]
    fn dc_offset_has_no_pitch() {
        let signal = Signal::new(vec![0.3f32; 8_192], 16_000);
        let mut est = PyinEstimator::default();
        let contour = est.track(&signal, &default_framer());
        assert_eq!(contour.voiced_count(), 0);
    }

    #[test]
    fn single_frame_signal_is_tracked() {
        let signal = sine_signal(200.0, 0.5, 2048.0 / 16_000.0, 16_000);
        let mut est = PyinEstimator::default();
        let contour = est.track(&signal, &default_framer());
        assert_eq!(contour.len(), 1);
        let hz = contour.voiced().next().unwrap();
        assert!((198.0..=202.0).contains(&hz), "hz={hz}");
    }

    #[test]
    fn tracking_twice_gives_the_same_contour() {
        let signal = sine_signal(330.0, 0.4, 0.5, 16_000);
        let mut est = PyinEstimator::default();
        let framer = default_framer();
        let first = est.track(&signal, &framer);
        let second = est.track(&signal, &framer);
        assert_eq!(first, second);
    }

    #[test]
    fn degenerate_lag_range_is_all_unvoiced() {
        // fmin so low that lag_max caps at frame_length / 2, fmax so high
        // that lag_min exceeds it
        let signal = sine_signal(220.0, 0.5, 0.5, 16_000);
        let framer = Framer::new(16, 8, TailPolicy::ZeroPad).unwrap();
        let mut est = PyinEstimator::default();
        let contour = est.track(&signal, &framer);
        assert_eq!(contour.voiced_count(), 0);
        assert_eq!(contour.len(), framer.frame_count(signal.samples.len()));
    }
}
