//! Typed audio buffer handed to the analyzer by the decoding layer.

/// A contiguous block of mono PCM samples at a known sample rate.
///
/// Decoding and resampling happen upstream; the analyzer expects the
/// nominal 16 kHz mono signal the decoder contract promises, with
/// samples in [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Mono f32 samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g. 16000).
    pub sample_rate: u32,
}

impl Signal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Returns the duration of this signal in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Returns true if the signal contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_of_one_second_at_16k() {
        let signal = Signal::new(vec![0.0; 16_000], 16_000);
        assert!((signal.duration_secs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_signal_reports_empty() {
        let signal = Signal::new(vec![], 16_000);
        assert!(signal.is_empty());
        assert_eq!(signal.duration_secs(), 0.0);
    }
}
