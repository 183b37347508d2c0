//! # vocalis-core
//!
//! Voice acoustic-feature extraction: frame-based pitch tracking with
//! voiced/unvoiced decisions, per-frame RMS energy, and the perturbation
//! statistics built on top of them — mean pitch, jitter and shimmer.
//!
//! ## Architecture
//!
//! ```text
//! decoded mono signal ──► Framer ──► PitchEstimator ──► PitchContour ─┐
//!                           │                                         │
//!                           └─────► energy_contour ──► EnergyContour ─┤
//!                                                                     ▼
//!                                        mean_pitch / jitter / shimmer
//!                                                                     │
//!                                                                     ▼
//!                                                           VoiceReport
//! ```
//!
//! Decoding, resampling and transport live upstream: the analyzer takes a
//! mono f32 buffer at a known sample rate and returns three numbers. Each
//! call is pure and synchronous; run analyzers on parallel threads freely
//! as long as each thread owns its own.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod analyzer;
pub mod energy;
pub mod error;
pub mod framing;
pub mod perturbation;
pub mod pitch;
pub mod report;
pub mod signal;

// Convenience re-exports for downstream crates
pub use analyzer::{AnalyzerConfig, VoiceAnalyzer, NOMINAL_SAMPLE_RATE};
pub use energy::EnergyContour;
pub use error::{Result, VocalisError};
pub use framing::{Framer, TailPolicy};
pub use pitch::{McLeodEstimator, PitchContour, PitchEstimator, PyinEstimator};
pub use report::VoiceReport;
pub use signal::Signal;
