//! Single biquad (bi-quadratic) filter section.
//!
//! A [`BiquadSection`] is one second-order IIR cell. Sections are cascaded by
//! [`FilterBank`](crate::FilterBank) to build higher-order responses.
//!
//! Coefficient calculation uses the RBJ Audio EQ Cookbook formulas, driven by
//! a *normalized* cutoff (cutoff frequency divided by sample rate).

use core::f32::consts::PI;
use libm::{cosf, sinf};

/// Response type of a filter section or bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// Passes frequencies below the cutoff.
    Lowpass,
    /// Passes frequencies above the cutoff.
    Highpass,
}

impl FilterType {
    /// Short lowercase name, used in logs and configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Lowpass => "lowpass",
            FilterType::Highpass => "highpass",
        }
    }
}

/// Normalized biquad coefficients (`a0` already divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Feedforward coefficient for x[n].
    pub b0: f32,
    /// Feedforward coefficient for x[n-1].
    pub b1: f32,
    /// Feedforward coefficient for x[n-2].
    pub b2: f32,
    /// Feedback coefficient for y[n-1].
    pub a1: f32,
    /// Feedback coefficient for y[n-2].
    pub a2: f32,
}

impl Coefficients {
    /// Identity coefficients: `y[n] = x[n]`.
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn normalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }
}

/// Calculates low-pass coefficients using the RBJ cookbook formula.
///
/// # Arguments
///
/// * `normalized_cutoff` - Cutoff frequency divided by sample rate, in (0, 0.5)
/// * `q` - Quality factor (0.707 for a single Butterworth section)
pub fn lowpass_coefficients(normalized_cutoff: f32, q: f32) -> Coefficients {
    let omega = 2.0 * PI * normalized_cutoff;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    Coefficients::normalized(b0, b1, b2, a0, a1, a2)
}

/// Calculates high-pass coefficients using the RBJ cookbook formula.
///
/// # Arguments
///
/// * `normalized_cutoff` - Cutoff frequency divided by sample rate, in (0, 0.5)
/// * `q` - Quality factor (0.707 for a single Butterworth section)
pub fn highpass_coefficients(normalized_cutoff: f32, q: f32) -> Coefficients {
    let omega = 2.0 * PI * normalized_cutoff;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    let b0 = (1.0 + cos_omega) / 2.0;
    let b1 = -(1.0 + cos_omega);
    let b2 = (1.0 + cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    Coefficients::normalized(b0, b1, b2, a0, a1, a2)
}

/// One second-order IIR cell with its own coefficients and state.
///
/// Implements the Transposed Direct Form II structure:
/// ```text
/// y[n]  = b0*x[n] + s1
/// s1'   = b1*x[n] - a1*y[n] + s2
/// s2'   = b2*x[n] - a2*y[n]
/// ```
///
/// The two state registers carry the input/output history between calls and
/// persist until the section is redesigned or [`clear`](Self::clear)ed.
#[derive(Debug, Clone)]
pub struct BiquadSection {
    filter_type: FilterType,
    normalized_cutoff: f32,
    q: f32,
    peak_gain_db: f32,
    coeffs: Coefficients,

    /// State registers
    s1: f32,
    s2: f32,
}

impl BiquadSection {
    /// Creates a section with passthrough coefficients.
    ///
    /// Initial state: `y[n] = x[n]` until [`design`](Self::design) is called.
    pub fn new() -> Self {
        Self {
            filter_type: FilterType::Lowpass,
            normalized_cutoff: 0.5,
            q: core::f32::consts::FRAC_1_SQRT_2,
            peak_gain_db: 0.0,
            coeffs: Coefficients::PASSTHROUGH,
            s1: 0.0,
            s2: 0.0,
        }
    }

    /// Computes coefficients for the requested response and resets state.
    ///
    /// `normalized_cutoff` must lie strictly inside (0, 0.5); callers clamp
    /// the cutoff in Hz before normalizing. `peak_gain_db` is stored for
    /// completeness but does not affect low-pass/high-pass shapes.
    pub fn design(
        &mut self,
        filter_type: FilterType,
        normalized_cutoff: f32,
        q: f32,
        peak_gain_db: f32,
    ) {
        debug_assert!(
            normalized_cutoff > 0.0 && normalized_cutoff < 0.5,
            "normalized cutoff {normalized_cutoff} outside (0, 0.5)"
        );
        debug_assert!(q > 0.0, "Q must be positive, got {q}");

        self.filter_type = filter_type;
        self.normalized_cutoff = normalized_cutoff;
        self.q = q;
        self.peak_gain_db = peak_gain_db;
        self.coeffs = match filter_type {
            FilterType::Lowpass => lowpass_coefficients(normalized_cutoff, q),
            FilterType::Highpass => highpass_coefficients(normalized_cutoff, q),
        };
        self.clear();
    }

    /// Processes a single sample. No clamping is applied.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + self.s1;
        self.s1 = c.b1 * input - c.a1 * output + self.s2;
        self.s2 = c.b2 * input - c.a2 * output;
        output
    }

    /// Clears the state registers without touching the coefficients.
    pub fn clear(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }

    /// Response type of the last design.
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Normalized cutoff of the last design.
    pub fn normalized_cutoff(&self) -> f32 {
        self.normalized_cutoff
    }

    /// Quality factor of the last design.
    pub fn q(&self) -> f32 {
        self.q
    }

    /// Peak gain in dB of the last design.
    pub fn peak_gain_db(&self) -> f32 {
        self.peak_gain_db
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> Coefficients {
        self.coeffs
    }
}

impl Default for BiquadSection {
    fn default() -> Self {
        Self::new()
    }
}
