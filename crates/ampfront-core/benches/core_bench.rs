//! Criterion benchmarks for ampfront-core filter banks
//!
//! Run with: cargo bench -p ampfront-core
#![allow(missing_docs)]

use ampfront_core::{BiquadSection, FilterBank, FilterType, StereoFilters, clamp_i16};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const SAMPLE_RATE: f32 = 44100.0;
const BLOCK_SIZES: &[usize] = &[64, 200, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 16000.0
        })
        .collect()
}

fn bench_section(c: &mut Criterion) {
    let mut group = c.benchmark_group("BiquadSection");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("process", block_size),
            &block_size,
            |b, _| {
                let mut section = BiquadSection::new();
                section.design(FilterType::Lowpass, 1000.0 / SAMPLE_RATE, 0.707, 0.0);
                b.iter(|| {
                    for &sample in &input {
                        black_box(section.process(black_box(sample)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("FilterBank");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("process_chain", block_size),
            &block_size,
            |b, _| {
                let mut bank = FilterBank::new(FilterType::Lowpass, SAMPLE_RATE);
                bank.design(FilterType::Lowpass, 1000.0, SAMPLE_RATE);
                b.iter(|| {
                    for &sample in &input {
                        black_box(bank.process_chain(black_box(sample)));
                    }
                });
            },
        );
    }

    group.bench_function("design", |b| {
        let mut bank = FilterBank::new(FilterType::Highpass, SAMPLE_RATE);
        b.iter(|| bank.design(FilterType::Highpass, black_box(120.0), SAMPLE_RATE));
    });

    group.finish();
}

fn bench_stereo(c: &mut Criterion) {
    let mut group = c.benchmark_group("StereoFilters");

    // 200 frames == one 800-byte playback chunk
    let input = generate_test_signal(200);
    group.bench_function("chunk_200_frames", |b| {
        let mut filters = StereoFilters::new(SAMPLE_RATE);
        filters.set(FilterType::Lowpass, 8000.0, SAMPLE_RATE);
        filters.set(FilterType::Highpass, 80.0, SAMPLE_RATE);
        b.iter(|| {
            for &sample in &input {
                let l = clamp_i16(filters.process_left(black_box(sample)));
                let r = clamp_i16(filters.process_right(black_box(sample)));
                black_box((l, r));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_section, bench_bank, bench_stereo);
criterion_main!(benches);
