//! Frame grid shared by the pitch and energy stages.
//!
//! A `Framer` turns a signal of length `N` into overlapping windows of
//! `frame_length` samples spaced `hop_length` apart. With the defaults
//! (2048 / 512 at 16 kHz) that is a 128 ms window every 32 ms, 75% overlap.
//!
//! Frame count:
//! - `N == 0` → 0 frames.
//! - `0 < N < frame_length` → 1 fully padded frame (`ZeroPad`) or 0 (`Drop`).
//! - otherwise → `ceil((N - F) / H) + 1` for `ZeroPad` (tail frames padded
//!   with zeros), `floor((N - F) / H) + 1` for `Drop` (full frames only).

use serde::{Deserialize, Serialize};

use crate::error::{Result, VocalisError};

/// What to do when the signal does not fill the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    /// Emit partial tail frames padded with zeros. A non-empty signal
    /// shorter than one frame yields exactly one padded frame.
    #[default]
    ZeroPad,
    /// Emit only fully contained frames. A signal shorter than one frame
    /// yields zero frames.
    Drop,
}

/// Slices a signal into overlapping analysis frames.
///
/// Pure positional arithmetic; the framer never owns sample data. Frames
/// are copied into a caller-provided scratch buffer so the per-frame loop
/// does not allocate.
#[derive(Debug, Clone)]
pub struct Framer {
    frame_length: usize,
    hop_length: usize,
    tail: TailPolicy,
}

impl Framer {
    /// Create a framer.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `frame_length` or `hop_length` is zero.
    pub fn new(frame_length: usize, hop_length: usize, tail: TailPolicy) -> Result<Self> {
        if frame_length == 0 {
            return Err(VocalisError::InvalidConfig(
                "frame_length must be positive".into(),
            ));
        }
        if hop_length == 0 {
            return Err(VocalisError::InvalidConfig(
                "hop_length must be positive".into(),
            ));
        }
        Ok(Self {
            frame_length,
            hop_length,
            tail,
        })
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    pub fn tail_policy(&self) -> TailPolicy {
        self.tail
    }

    /// Number of frames produced for a signal of `signal_len` samples.
    pub fn frame_count(&self, signal_len: usize) -> usize {
        if signal_len == 0 {
            return 0;
        }
        if signal_len < self.frame_length {
            return match self.tail {
                TailPolicy::ZeroPad => 1,
                TailPolicy::Drop => 0,
            };
        }
        let span = signal_len - self.frame_length;
        match self.tail {
            TailPolicy::ZeroPad => span.div_ceil(self.hop_length) + 1,
            TailPolicy::Drop => span / self.hop_length + 1,
        }
    }

    /// Sample offset of frame `index`.
    pub fn frame_start(&self, index: usize) -> usize {
        index * self.hop_length
    }

    /// Copy frame `index` into `out`, zero-padding past the end of `samples`.
    ///
    /// `out` is cleared and resized to exactly `frame_length`. Indices at or
    /// beyond `frame_count` produce a fully zero frame rather than panicking.
    pub fn fill_frame(&self, samples: &[f32], index: usize, out: &mut Vec<f32>) {
        let start = self.frame_start(index);
        out.clear();
        if start < samples.len() {
            let end = (start + self.frame_length).min(samples.len());
            out.extend_from_slice(&samples[start..end]);
        }
        out.resize(self.frame_length, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framer(tail: TailPolicy) -> Framer {
        Framer::new(2048, 512, tail).unwrap()
    }

    #[test]
    fn count_matches_overlap_formula() {
        // 3 s at 16 kHz: ceil((48000 - 2048) / 512) + 1 = 91
        let f = framer(TailPolicy::ZeroPad);
        assert_eq!(f.frame_count(48_000), 91);
    }

    #[test]
    fn exact_fit_is_a_single_frame() {
        assert_eq!(framer(TailPolicy::ZeroPad).frame_count(2048), 1);
        assert_eq!(framer(TailPolicy::Drop).frame_count(2048), 1);
    }

    #[test]
    fn one_extra_sample_adds_a_padded_frame() {
        assert_eq!(framer(TailPolicy::ZeroPad).frame_count(2049), 2);
        // Drop keeps only the fully contained frame
        assert_eq!(framer(TailPolicy::Drop).frame_count(2049), 1);
    }

    #[test]
    fn short_signal_per_tail_policy() {
        assert_eq!(framer(TailPolicy::ZeroPad).frame_count(1000), 1);
        assert_eq!(framer(TailPolicy::Drop).frame_count(1000), 0);
    }

    #[test]
    fn empty_signal_has_no_frames() {
        assert_eq!(framer(TailPolicy::ZeroPad).frame_count(0), 0);
        assert_eq!(framer(TailPolicy::Drop).frame_count(0), 0);
    }

    #[test]
    fn fill_frame_pads_the_tail_with_zeros() {
        let f = framer(TailPolicy::ZeroPad);
        let samples = vec![0.25f32; 1000];
        let mut out = Vec::new();
        f.fill_frame(&samples, 0, &mut out);
        assert_eq!(out.len(), 2048);
        assert!(out[..1000].iter().all(|&s| s == 0.25));
        assert!(out[1000..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn fill_frame_copies_the_hop_offset_window() {
        let f = framer(TailPolicy::ZeroPad);
        let samples: Vec<f32> = (0..4096).map(|i| i as f32).collect();
        let mut out = Vec::new();
        f.fill_frame(&samples, 1, &mut out);
        assert_eq!(out[0], 512.0);
        assert_eq!(out[2047], 2559.0);
    }

    #[test]
    fn fill_frame_past_the_signal_is_all_zeros() {
        let f = framer(TailPolicy::ZeroPad);
        let samples = vec![1.0f32; 100];
        let mut out = Vec::new();
        f.fill_frame(&samples, 5, &mut out);
        assert_eq!(out.len(), 2048);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zero_lengths_are_rejected() {
        assert!(Framer::new(0, 512, TailPolicy::ZeroPad).is_err());
        assert!(Framer::new(2048, 0, TailPolicy::ZeroPad).is_err());
    }
}
