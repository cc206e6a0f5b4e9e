//! Ampfront Core - filter bank and sample primitives
//!
//! This crate holds the numeric half of the ampfront audio front-end: the
//! cascaded biquad filter banks and the per-sample helpers used by the
//! transform pipeline. It performs no I/O and never allocates.
//!
//! # Filters
//!
//! - [`BiquadSection`] - Second-order IIR cell with RBJ cookbook coefficients
//! - [`FilterBank`] - [`FILTER_SECTIONS`] sections cascaded into a Butterworth response
//! - [`StereoFilters`] - The four banks of the stereo path (L/R low-pass, L/R high-pass)
//!
//! # Frames
//!
//! - [`AudioFrame`] - One stereo pair of `i16` output slots
//! - [`AudioSource`] - Active source selector, which also sets routing polarity
//!
//! # Utilities
//!
//! - [`volume_from_scale`], [`clamp_i16`], [`read_stereo_le`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature to use the crate on bare-metal targets:
//!
//! ```toml
//! [dependencies]
//! ampfront-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use ampfront_core::{FilterType, StereoFilters, clamp_i16};
//!
//! let mut filters = StereoFilters::new(44100.0);
//! filters.set(FilterType::Lowpass, 8000.0, 44100.0);
//!
//! let left = clamp_i16(filters.process_left(1200.0));
//! # let _ = left;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod biquad;
pub mod filter_bank;
pub mod frame;
pub mod math;

pub use biquad::{
    BiquadSection, Coefficients, FilterType, highpass_coefficients, lowpass_coefficients,
};
pub use filter_bank::{
    DEFAULT_HIGHPASS_HZ, DEFAULT_LOWPASS_HZ, FILTER_SECTIONS, FilterBank, MAX_CUTOFF_HZ,
    MIN_CUTOFF_HZ, StereoFilters, butterworth_q, clamp_cutoff,
};
pub use frame::{AudioFrame, AudioSource};
pub use math::{
    MAX_VOLUME, MAX_VOLUME_SCALE, NEUTRAL_VOLUME_SCALE, clamp_i16, read_stereo_le,
    volume_from_scale,
};
