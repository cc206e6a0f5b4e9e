//! Integration tests for ampfront-core filter banks.
//!
//! Verifies the cascaded Butterworth responses with sine-wave measurements
//! and the low-pass-then-high-pass composition of the stereo path.

use ampfront_core::{FilterBank, FilterType, StereoFilters, butterworth_q, FILTER_SECTIONS};

const SAMPLE_RATE: f32 = 44100.0;
const TAU: f32 = core::f32::consts::TAU;

/// Generate a sine wave buffer at the given frequency.
fn generate_sine(freq_hz: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| libm::sinf(TAU * freq_hz * n as f32 / SAMPLE_RATE))
        .collect()
}

/// Measure RMS amplitude of a signal buffer.
fn rms(signal: &[f32]) -> f32 {
    let sum_sq: f32 = signal.iter().map(|&s| s * s).sum();
    libm::sqrtf(sum_sq / signal.len() as f32)
}

/// Convert linear amplitude to dB.
fn to_db(linear: f32) -> f32 {
    20.0 * libm::log10f(linear.max(1e-10))
}

/// Gain in dB of `process` at `freq_hz`, measured after the transient.
fn measure(mut process: impl FnMut(f32) -> f32, freq_hz: f32) -> f32 {
    let num_samples = 22050;
    let settle_samples = 11025;
    let input = generate_sine(freq_hz, num_samples);
    let output: Vec<f32> = input.iter().map(|&s| process(s)).collect();
    to_db(rms(&output[settle_samples..]) / rms(&input[settle_samples..]))
}

fn bank(filter_type: FilterType, cutoff: f32) -> FilterBank {
    let mut bank = FilterBank::new(filter_type, SAMPLE_RATE);
    bank.design(filter_type, cutoff, SAMPLE_RATE);
    bank
}

#[test]
fn lowpass_bank_frequency_response() {
    let cutoff = 1000.0;

    let mut b = bank(FilterType::Lowpass, cutoff);
    let pass = measure(|s| b.process_chain(s), 100.0);
    assert!(pass.abs() < 0.5, "passband should be flat, got {pass:.2} dB");

    let mut b = bank(FilterType::Lowpass, cutoff);
    let at_cutoff = measure(|s| b.process_chain(s), cutoff);
    assert!(
        (at_cutoff + 3.01).abs() < 0.5,
        "Butterworth cascade should be -3 dB at cutoff, got {at_cutoff:.2} dB"
    );

    let mut b = bank(FilterType::Lowpass, cutoff);
    let stop = measure(|s| b.process_chain(s), 4000.0);
    assert!(stop < -60.0, "two octaves up should be < -60 dB, got {stop:.2} dB");
}

#[test]
fn highpass_bank_frequency_response() {
    let cutoff = 1000.0;

    let mut b = bank(FilterType::Highpass, cutoff);
    let pass = measure(|s| b.process_chain(s), 8000.0);
    assert!(pass.abs() < 0.5, "passband should be flat, got {pass:.2} dB");

    let mut b = bank(FilterType::Highpass, cutoff);
    let at_cutoff = measure(|s| b.process_chain(s), cutoff);
    assert!(
        (at_cutoff + 3.01).abs() < 0.5,
        "Butterworth cascade should be -3 dB at cutoff, got {at_cutoff:.2} dB"
    );

    let mut b = bank(FilterType::Highpass, cutoff);
    let stop = measure(|s| b.process_chain(s), 250.0);
    assert!(stop < -60.0, "two octaves down should be < -60 dB, got {stop:.2} dB");
}

#[test]
fn stereo_path_composes_band_pass() {
    let mut filters = StereoFilters::new(SAMPLE_RATE);
    filters.set(FilterType::Lowpass, 4000.0, SAMPLE_RATE);
    filters.set(FilterType::Highpass, 250.0, SAMPLE_RATE);

    let center = measure(|s| filters.process_left(s), 1000.0);
    assert!(center.abs() < 0.5, "band center should pass, got {center:.2} dB");

    filters.clear();
    let low = measure(|s| filters.process_right(s), 50.0);
    assert!(low < -30.0, "below band should be cut, got {low:.2} dB");

    filters.clear();
    let high = measure(|s| filters.process_right(s), 15000.0);
    assert!(high < -30.0, "above band should be cut, got {high:.2} dB");
}

#[test]
fn channels_are_independent() {
    let mut filters = StereoFilters::new(SAMPLE_RATE);
    filters.set(FilterType::Lowpass, 2000.0, SAMPLE_RATE);

    // Driving only the left channel must leave the right state untouched.
    for s in generate_sine(500.0, 1000) {
        filters.process_left(s * 10000.0);
    }
    assert_eq!(filters.process_right(0.0), 0.0);
}

#[test]
fn section_q_matches_distribution() {
    let b = bank(FilterType::Lowpass, 3000.0);
    for (i, section) in b.sections().iter().enumerate() {
        assert_eq!(section.q(), butterworth_q(i, FILTER_SECTIONS));
    }
}
