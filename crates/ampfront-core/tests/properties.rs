//! Property-based tests for ampfront-core.
//!
//! Covers filter stability and decay, the cutoff clamping law, volume
//! clamping and the routing law using proptest for randomized inputs.

use ampfront_core::{
    AudioFrame, AudioSource, FILTER_SECTIONS, FilterBank, FilterType, MAX_CUTOFF_HZ,
    MIN_CUTOFF_HZ, StereoFilters, clamp_i16, volume_from_scale,
};
use proptest::prelude::*;

const SR: f32 = 44100.0;

fn filter_type(variant: usize) -> FilterType {
    if variant % 2 == 0 {
        FilterType::Lowpass
    } else {
        FilterType::Highpass
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// A freshly designed bank fed silence produces silence.
    #[test]
    fn zero_input_stays_zero(
        cutoff in 20.0f32..20000.0f32,
        variant in 0usize..2,
        extra in 0usize..64,
    ) {
        let mut bank = FilterBank::new(filter_type(variant), SR);
        bank.design(filter_type(variant), cutoff, SR);

        for _ in 0..(2 * FILTER_SECTIONS * 2 + extra) {
            let out = bank.process_chain(0.0);
            prop_assert_eq!(out, 0.0);
        }
    }

    /// After an excitation, a zero tail decays toward zero (no steady offset).
    #[test]
    fn excitation_decays_to_zero(
        cutoff in 200.0f32..18000.0f32,
        variant in 0usize..2,
        input in prop::array::uniform32(-32768.0f32..=32767.0f32),
    ) {
        let mut bank = FilterBank::new(filter_type(variant), SR);
        bank.design(filter_type(variant), cutoff, SR);

        for &sample in &input {
            let out = bank.process_chain(sample);
            prop_assert!(out.is_finite());
        }

        let mut last = f32::MAX;
        for _ in 0..20000 {
            last = bank.process_chain(0.0);
        }
        prop_assert!(last.abs() < 1e-2, "tail did not decay: {}", last);
    }

    /// Cutoffs outside [2, 20000] behave exactly like the nearest bound.
    #[test]
    fn cutoff_clamping_law(
        below in -1.0e6f32..MIN_CUTOFF_HZ,
        above in MAX_CUTOFF_HZ..1.0e7f32,
        variant in 0usize..2,
        input in prop::array::uniform16(-30000.0f32..=30000.0f32),
    ) {
        let ft = filter_type(variant);
        for (request, bound) in [(below, MIN_CUTOFF_HZ), (above, MAX_CUTOFF_HZ)] {
            let mut requested = FilterBank::new(ft, SR);
            requested.design(ft, request, SR);
            let mut reference = FilterBank::new(ft, SR);
            reference.design(ft, bound, SR);

            prop_assert_eq!(requested.cutoff_hz(), bound);
            for &sample in &input {
                prop_assert_eq!(requested.process_chain(sample), reference.process_chain(sample));
            }
        }
    }

    /// Any volume scale lands in [0, 2].
    #[test]
    fn volume_multiplier_is_clamped(scale in -1000.0f32..1000.0f32) {
        let v = volume_from_scale(scale);
        prop_assert!((0.0..=2.0).contains(&v));
        if (0.0..=9.0).contains(&scale) {
            prop_assert!((v - scale / 5.0).abs() < 1e-6);
        }
    }

    /// Routing law: selector 0 keeps order, selector 1 swaps.
    #[test]
    fn routing_law(left in any::<i16>(), right in any::<i16>()) {
        let wireless = AudioFrame::from_computed(left, right, AudioSource::Wireless);
        prop_assert_eq!(wireless.slots, [left, right]);
        let storage = AudioFrame::from_computed(left, right, AudioSource::Storage);
        prop_assert_eq!(storage.slots, [right, left]);
    }

    /// Filtered output is always representable after clamping.
    #[test]
    fn stereo_filters_output_clamps(
        low in 100.0f32..20000.0f32,
        high in 2.0f32..2000.0f32,
        input in prop::array::uniform32(any::<i16>()),
    ) {
        let mut filters = StereoFilters::new(SR);
        filters.set(FilterType::Lowpass, low, SR);
        filters.set(FilterType::Highpass, high, SR);
        for &sample in &input {
            let y = filters.process_left(f32::from(sample) * 2.0);
            prop_assert!(y.is_finite());
            let _ = clamp_i16(y);
        }
    }
}
