//! Cascaded biquad filter banks.
//!
//! A [`FilterBank`] chains [`FILTER_SECTIONS`] biquad sections that share a
//! response type and cutoff but differ in Q, so that the cascade approximates
//! a single Butterworth response of order `2 * FILTER_SECTIONS`.
//!
//! [`StereoFilters`] groups the four banks used by the sample pipeline:
//! left/right low-pass and left/right high-pass. A channel always runs through
//! its low-pass bank first, then its high-pass bank, which composes a
//! band-pass when both cutoffs are set.

use crate::biquad::{BiquadSection, FilterType};
use core::f32::consts::PI;
use libm::cosf;

/// Number of biquad sections per bank (filter order / 2).
pub const FILTER_SECTIONS: usize = 3;

/// Lowest cutoff a bank accepts; lower requests are clamped.
pub const MIN_CUTOFF_HZ: f32 = 2.0;

/// Highest cutoff a bank accepts; higher requests are clamped.
pub const MAX_CUTOFF_HZ: f32 = 20000.0;

/// Low-pass cutoff used before any filter has been requested.
pub const DEFAULT_LOWPASS_HZ: f32 = MAX_CUTOFF_HZ;

/// High-pass cutoff used before any filter has been requested.
pub const DEFAULT_HIGHPASS_HZ: f32 = MIN_CUTOFF_HZ;

/// Largest normalized cutoff handed to a section (just under Nyquist).
const MAX_NORMALIZED_CUTOFF: f32 = 0.49;

/// Clamps a requested cutoff into `[MIN_CUTOFF_HZ, MAX_CUTOFF_HZ]`.
///
/// Non-finite requests fall back to the nearest meaningful bound: NaN maps to
/// the maximum, infinities to their respective ends.
#[inline]
pub fn clamp_cutoff(cutoff_hz: f32) -> f32 {
    if cutoff_hz.is_nan() {
        return MAX_CUTOFF_HZ;
    }
    cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
}

/// Q of section `index` in an `sections`-long Butterworth cascade.
///
/// ```text
/// Q_i = 1 / (2 * cos(PI / (4N) + i * PI / (2N)))
/// ```
///
/// # Example
/// ```rust
/// use ampfront_core::butterworth_q;
///
/// // A single section is the classic 1/sqrt(2)
/// assert!((butterworth_q(0, 1) - 0.7071).abs() < 1e-3);
/// ```
#[inline]
pub fn butterworth_q(index: usize, sections: usize) -> f32 {
    let n = sections as f32;
    let angle = PI / (4.0 * n) + index as f32 * PI / (2.0 * n);
    1.0 / (2.0 * cosf(angle))
}

/// Ordered cascade of [`FILTER_SECTIONS`] biquad sections.
#[derive(Debug, Clone)]
pub struct FilterBank {
    filter_type: FilterType,
    cutoff_hz: f32,
    sections: [BiquadSection; FILTER_SECTIONS],
}

impl FilterBank {
    /// Creates a bank of the given type at its default cutoff, designed for
    /// `sample_rate`.
    pub fn new(filter_type: FilterType, sample_rate: f32) -> Self {
        let cutoff_hz = match filter_type {
            FilterType::Lowpass => DEFAULT_LOWPASS_HZ,
            FilterType::Highpass => DEFAULT_HIGHPASS_HZ,
        };
        let mut bank = Self {
            filter_type,
            cutoff_hz,
            sections: core::array::from_fn(|_| BiquadSection::new()),
        };
        bank.design(filter_type, cutoff_hz, sample_rate);
        bank
    }

    /// Designs every section for `filter_type` at `cutoff_hz`.
    ///
    /// The cutoff is clamped into `[MIN_CUTOFF_HZ, MAX_CUTOFF_HZ]` and then
    /// normalized by `sample_rate`. At very low sample rates the normalized
    /// value is additionally held just under Nyquist. All section state is
    /// reset.
    ///
    /// Requires exclusive access, so it can never overlap
    /// [`process_chain`](Self::process_chain) on the same bank.
    pub fn design(&mut self, filter_type: FilterType, cutoff_hz: f32, sample_rate: f32) {
        let cutoff_hz = clamp_cutoff(cutoff_hz);
        let normalized = (cutoff_hz / sample_rate).min(MAX_NORMALIZED_CUTOFF);

        self.filter_type = filter_type;
        self.cutoff_hz = cutoff_hz;

        for index in 0..FILTER_SECTIONS {
            let q = butterworth_q(index, FILTER_SECTIONS);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                filter = filter_type.as_str(),
                section = index,
                q,
                normalized_cutoff = normalized,
                "filter section designed"
            );
            self.sections[index].design(filter_type, normalized, q, 0.0);
        }
    }

    /// Runs `sample` through every section in order.
    #[inline]
    pub fn process_chain(&mut self, sample: f32) -> f32 {
        self.sections
            .iter_mut()
            .fold(sample, |acc, section| section.process(acc))
    }

    /// Clears all section state, keeping the design.
    pub fn clear(&mut self) {
        for section in &mut self.sections {
            section.clear();
        }
    }

    /// Response type of the bank.
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Cutoff in Hz after clamping.
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Read-only view of the sections.
    pub fn sections(&self) -> &[BiquadSection] {
        &self.sections
    }
}

/// The four banks used by the stereo sample path.
#[derive(Debug, Clone)]
pub struct StereoFilters {
    left_lowpass: FilterBank,
    right_lowpass: FilterBank,
    left_highpass: FilterBank,
    right_highpass: FilterBank,
}

impl StereoFilters {
    /// Creates all four banks at their default cutoffs
    /// ([`DEFAULT_LOWPASS_HZ`], [`DEFAULT_HIGHPASS_HZ`]).
    pub fn new(sample_rate: f32) -> Self {
        Self {
            left_lowpass: FilterBank::new(FilterType::Lowpass, sample_rate),
            right_lowpass: FilterBank::new(FilterType::Lowpass, sample_rate),
            left_highpass: FilterBank::new(FilterType::Highpass, sample_rate),
            right_highpass: FilterBank::new(FilterType::Highpass, sample_rate),
        }
    }

    /// Redesigns both banks of `filter_type` at `cutoff_hz`.
    pub fn set(&mut self, filter_type: FilterType, cutoff_hz: f32, sample_rate: f32) {
        let (left, right) = match filter_type {
            FilterType::Lowpass => (&mut self.left_lowpass, &mut self.right_lowpass),
            FilterType::Highpass => (&mut self.left_highpass, &mut self.right_highpass),
        };
        left.design(filter_type, cutoff_hz, sample_rate);
        right.design(filter_type, cutoff_hz, sample_rate);
    }

    /// Re-runs every design at its stored cutoff for a new sample rate.
    pub fn redesign(&mut self, sample_rate: f32) {
        for bank in self.banks_mut() {
            let (filter_type, cutoff_hz) = (bank.filter_type(), bank.cutoff_hz());
            bank.design(filter_type, cutoff_hz, sample_rate);
        }
    }

    /// Clears the state of all four banks.
    pub fn clear(&mut self) {
        for bank in self.banks_mut() {
            bank.clear();
        }
    }

    /// Left channel: low-pass chain, then high-pass chain.
    #[inline]
    pub fn process_left(&mut self, sample: f32) -> f32 {
        let low = self.left_lowpass.process_chain(sample);
        self.left_highpass.process_chain(low)
    }

    /// Right channel: low-pass chain, then high-pass chain.
    #[inline]
    pub fn process_right(&mut self, sample: f32) -> f32 {
        let low = self.right_lowpass.process_chain(sample);
        self.right_highpass.process_chain(low)
    }

    /// Current cutoff of the banks of `filter_type`.
    pub fn cutoff_hz(&self, filter_type: FilterType) -> f32 {
        match filter_type {
            FilterType::Lowpass => self.left_lowpass.cutoff_hz(),
            FilterType::Highpass => self.left_highpass.cutoff_hz(),
        }
    }

    fn banks_mut(&mut self) -> [&mut FilterBank; 4] {
        [
            &mut self.left_lowpass,
            &mut self.right_lowpass,
            &mut self.left_highpass,
            &mut self.right_highpass,
        ]
    }
}
