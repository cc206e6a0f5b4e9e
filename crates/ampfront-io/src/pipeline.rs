//! Per-sample transform pipeline.
//!
//! Bytes from either input path are decoded as interleaved little-endian
//! 16-bit stereo, scaled by the volume multiplier, optionally filtered
//! (low-pass then high-pass, per channel), clamped, routed by the active
//! source and written to the output transport one frame at a time.
//!
//! The tunables live in a [`PipelineConfig`] shared by `Arc`. Control entry
//! points store into its atomics and the hot path only loads, once per frame.

use crate::Result;
use crate::transport::{OutputTransport, TransportError};
use ampfront_core::{
    AudioFrame, AudioSource, FilterType, MAX_VOLUME, StereoFilters, clamp_i16, read_stereo_le,
    volume_from_scale,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};
use std::time::Duration;

/// Transport write timeouts for the two processing paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTimeouts {
    /// Timeout when filtering is disabled.
    pub unfiltered: Duration,
    /// Timeout when filtering is enabled.
    pub filtered: Duration,
}

impl Default for WriteTimeouts {
    fn default() -> Self {
        Self {
            unfiltered: Duration::from_millis(20),
            filtered: Duration::from_millis(100),
        }
    }
}

/// Tunables read by the pipeline on every frame.
#[derive(Debug)]
pub struct PipelineConfig {
    volume_bits: AtomicU32,
    filter_enabled: AtomicBool,
    source: AtomicU8,
    sample_rate: AtomicU32,
    timeouts: WriteTimeouts,
}

impl PipelineConfig {
    /// Neutral volume, filtering off, wireless routing.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            volume_bits: AtomicU32::new(1.0f32.to_bits()),
            filter_enabled: AtomicBool::new(false),
            source: AtomicU8::new(AudioSource::default().selector() as u8),
            sample_rate: AtomicU32::new(sample_rate),
            timeouts: WriteTimeouts::default(),
        }
    }

    /// Replaces the write timeouts.
    pub fn with_timeouts(mut self, timeouts: WriteTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Current volume multiplier in `[0, 2]`.
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Acquire))
    }

    /// Sets the multiplier directly, clamped to `[0, 2]`.
    pub fn set_volume(&self, multiplier: f32) {
        let v = if multiplier.is_nan() {
            0.0
        } else {
            multiplier.clamp(0.0, MAX_VOLUME)
        };
        self.volume_bits.store(v.to_bits(), Ordering::Release);
    }

    /// Sets the multiplier from the 0-9 user scale (5 is unity).
    pub fn set_volume_scale(&self, scale: f32) {
        self.set_volume(volume_from_scale(scale));
    }

    /// Whether samples go through the filter banks.
    pub fn filter_enabled(&self) -> bool {
        self.filter_enabled.load(Ordering::Acquire)
    }

    // Only the pipeline toggles this so the banks are designed before use.
    pub(crate) fn set_filter_enabled(&self, enabled: bool) {
        self.filter_enabled.store(enabled, Ordering::Release);
    }

    /// Active source, which decides channel routing.
    pub fn source(&self) -> AudioSource {
        AudioSource::from_selector(self.source.load(Ordering::Acquire))
    }

    /// Selects the active source.
    pub fn set_source(&self, source: AudioSource) {
        self.source.store(source.selector() as u8, Ordering::Release);
    }

    /// Flips the routing and returns the new source.
    pub fn reverse_source(&self) -> AudioSource {
        let previous = self.source.fetch_xor(1, Ordering::AcqRel);
        AudioSource::from_selector(previous ^ 1)
    }

    /// Output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Acquire)
    }

    pub(crate) fn store_sample_rate(&self, sample_rate: u32) {
        self.sample_rate.store(sample_rate, Ordering::Release);
    }

    /// Configured write timeouts.
    pub fn timeouts(&self) -> WriteTimeouts {
        self.timeouts
    }

    /// Timeout for one frame on the given path.
    pub fn write_timeout(&self, filtered: bool) -> Duration {
        if filtered {
            self.timeouts.filtered
        } else {
            self.timeouts.unfiltered
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(44100)
    }
}

/// Outcome of one [`SampleTransformPipeline::process`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Frames accepted by the transport.
    pub frames_written: usize,
    /// Frames the transport failed to take.
    pub frames_dropped: usize,
    /// Trailing bytes that did not form a whole stereo pair.
    pub ignored_bytes: usize,
}

impl FeedStats {
    /// Frames processed, written or not.
    pub fn frames(&self) -> usize {
        self.frames_written + self.frames_dropped
    }
}

impl std::ops::AddAssign for FeedStats {
    fn add_assign(&mut self, rhs: Self) {
        self.frames_written += rhs.frames_written;
        self.frames_dropped += rhs.frames_dropped;
        self.ignored_bytes += rhs.ignored_bytes;
    }
}

/// A pipeline shared between the streaming path and the playback worker.
pub type SharedPipeline = Arc<Mutex<SampleTransformPipeline>>;

/// Turns PCM bytes into routed frames on an output transport.
pub struct SampleTransformPipeline {
    config: Arc<PipelineConfig>,
    filters: StereoFilters,
    transport: Box<dyn OutputTransport>,
}

impl SampleTransformPipeline {
    /// Builds a pipeline and applies the configured sample rate to `transport`.
    pub fn new(
        config: Arc<PipelineConfig>,
        mut transport: Box<dyn OutputTransport>,
    ) -> Result<Self> {
        let sample_rate = config.sample_rate();
        transport.set_sample_rate(sample_rate)?;
        tracing::debug!(transport = transport.name(), sample_rate, "pipeline created");
        Ok(Self {
            filters: StereoFilters::new(sample_rate as f32),
            config,
            transport,
        })
    }

    /// Wraps the pipeline for sharing.
    pub fn into_shared(self) -> SharedPipeline {
        Arc::new(Mutex::new(self))
    }

    /// Shared tunables.
    pub fn config(&self) -> &Arc<PipelineConfig> {
        &self.config
    }

    /// The four filter banks.
    pub fn filters(&self) -> &StereoFilters {
        &self.filters
    }

    /// Name of the output transport.
    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Processes every whole stereo pair in `bytes`.
    ///
    /// Transport failures drop the frame and processing moves on.
    pub fn process(&mut self, bytes: &[u8]) -> FeedStats {
        let mut stats = FeedStats {
            ignored_bytes: bytes.len() % AudioFrame::BYTES,
            ..FeedStats::default()
        };

        for pair in bytes.chunks_exact(AudioFrame::BYTES) {
            let Some((raw_left, raw_right)) = read_stereo_le(pair) else {
                continue;
            };
            let volume = self.config.volume();
            let filtered = self.config.filter_enabled();
            let left = f32::from(raw_left) * volume;
            let right = f32::from(raw_right) * volume;

            let (left, right) = if filtered {
                (
                    clamp_i16(self.filters.process_left(left)),
                    clamp_i16(self.filters.process_right(right)),
                )
            } else {
                (clamp_i16(left), clamp_i16(right))
            };

            let frame = AudioFrame::from_computed(left, right, self.config.source());
            let timeout = self.config.write_timeout(filtered);
            match self.transport.write_frame(frame, timeout) {
                Ok(n) if n == AudioFrame::BYTES => stats.frames_written += 1,
                Ok(n) => {
                    tracing::trace!(written = n, "partial frame write");
                    stats.frames_dropped += 1;
                }
                Err(e) => {
                    tracing::trace!(error = %e, "frame dropped");
                    stats.frames_dropped += 1;
                }
            }
        }

        stats
    }

    /// Designs the filter pair for `filter_type` and turns filtering on.
    pub fn enable_filter(&mut self, filter_type: FilterType, cutoff_hz: f32) {
        let sample_rate = self.config.sample_rate() as f32;
        self.filters.set(filter_type, cutoff_hz, sample_rate);
        self.config.set_filter_enabled(true);
        tracing::debug!(
            filter = filter_type.as_str(),
            cutoff_hz = self.filters.cutoff_hz(filter_type),
            "filter enabled"
        );
    }

    /// Turns filtering off. Bank designs are kept.
    pub fn disable_filter(&mut self) {
        self.config.set_filter_enabled(false);
        tracing::debug!("filter disabled");
    }

    /// Changes the output sample rate: redesigns the banks at their stored
    /// cutoffs and reconfigures the transport.
    ///
    /// A rate of zero is ignored.
    pub fn set_sample_rate(
        &mut self,
        sample_rate: u32,
    ) -> std::result::Result<(), TransportError> {
        if sample_rate == 0 {
            tracing::warn!("ignoring sample rate of 0 Hz");
            return Ok(());
        }
        self.transport.set_sample_rate(sample_rate)?;
        if sample_rate != self.config.sample_rate() {
            self.config.store_sample_rate(sample_rate);
            self.filters.redesign(sample_rate as f32);
            tracing::debug!(sample_rate, "sample rate changed");
        }
        Ok(())
    }

    /// Zeroes all filter state.
    pub fn reset_filters(&mut self) {
        self.filters.clear();
    }

    /// Flushes the output transport.
    pub fn flush(&mut self) -> std::result::Result<(), TransportError> {
        self.transport.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{CaptureHandle, CaptureTransport};

    fn capture_pipeline(sample_rate: u32) -> (SampleTransformPipeline, CaptureHandle) {
        let (transport, handle) = CaptureTransport::new();
        let config = Arc::new(PipelineConfig::new(sample_rate));
        let pipeline = SampleTransformPipeline::new(config, Box::new(transport)).unwrap();
        (pipeline, handle)
    }

    fn pcm(pairs: &[(i16, i16)]) -> Vec<u8> {
        pairs
            .iter()
            .flat_map(|&(l, r)| {
                let mut b = [0u8; 4];
                b[..2].copy_from_slice(&l.to_le_bytes());
                b[2..].copy_from_slice(&r.to_le_bytes());
                b
            })
            .collect()
    }

    /// Transport that rejects every other frame.
    struct Flaky {
        calls: usize,
    }

    impl OutputTransport for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn write_frame(
            &mut self,
            _: AudioFrame,
            timeout: Duration,
        ) -> std::result::Result<usize, TransportError> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                Err(TransportError::Timeout(timeout))
            } else {
                Ok(AudioFrame::BYTES)
            }
        }

        fn set_sample_rate(&mut self, _: u32) -> std::result::Result<(), TransportError> {
            Ok(())
        }
    }

    #[test]
    fn test_neutral_volume_is_identity() {
        let (mut p, handle) = capture_pipeline(44100);
        p.config().set_volume_scale(5.0);
        let input = [(0, 0), (1, -1), (i16::MAX, i16::MIN), (1234, -4321)];
        let stats = p.process(&pcm(&input));

        assert_eq!(stats.frames_written, 4);
        let slots: Vec<(i16, i16)> = handle
            .frames()
            .iter()
            .map(|f| (f.slots[0], f.slots[1]))
            .collect();
        assert_eq!(slots, input);
    }

    #[test]
    fn test_storage_source_swaps_slots() {
        let (mut p, handle) = capture_pipeline(44100);
        p.config().set_source(AudioSource::Storage);
        p.process(&pcm(&[(100, -200)]));
        assert_eq!(handle.frames()[0].slots, [-200, 100]);

        assert_eq!(p.config().reverse_source(), AudioSource::Wireless);
        p.process(&pcm(&[(100, -200)]));
        assert_eq!(handle.frames()[1].slots, [100, -200]);
    }

    #[test]
    fn test_volume_scales_and_clamps() {
        let (mut p, handle) = capture_pipeline(44100);
        p.config().set_volume_scale(7.5);
        p.process(&pcm(&[(1000, -1000), (30000, -30000)]));
        let frames = handle.frames();
        assert_eq!(frames[0].slots, [1500, -1500]);
        assert_eq!(frames[1].slots, [i16::MAX, i16::MIN]);

        p.config().set_volume_scale(0.0);
        p.process(&pcm(&[(1000, -1000)]));
        assert_eq!(handle.frames()[2].slots, [0, 0]);

        p.config().set_volume_scale(-3.0);
        assert_eq!(p.config().volume(), 0.0);
        p.config().set_volume_scale(42.0);
        assert_eq!(p.config().volume(), 2.0);
    }

    #[test]
    fn test_trailing_partial_pair_is_ignored() {
        let (mut p, handle) = capture_pipeline(44100);
        let mut bytes = pcm(&[(1, 2), (3, 4)]);
        bytes.extend_from_slice(&[9, 9, 9]);
        let stats = p.process(&bytes);
        assert_eq!(stats.frames_written, 2);
        assert_eq!(stats.ignored_bytes, 3);
        assert_eq!(handle.frame_count(), 2);
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let (mut p, handle) = capture_pipeline(44100);
        assert_eq!(p.process(&[]), FeedStats::default());
        assert_eq!(handle.frame_count(), 0);
    }

    #[test]
    fn test_transport_failures_drop_frames() {
        let config = Arc::new(PipelineConfig::new(44100));
        let mut p =
            SampleTransformPipeline::new(config, Box::new(Flaky { calls: 0 })).unwrap();
        let stats = p.process(&pcm(&[(1, 1); 10]));
        assert_eq!(stats.frames_written, 5);
        assert_eq!(stats.frames_dropped, 5);
        assert_eq!(stats.frames(), 10);
    }

    #[test]
    fn test_timeout_follows_filter_path() {
        let (mut p, handle) = capture_pipeline(44100);
        p.process(&pcm(&[(0, 0)]));
        p.enable_filter(FilterType::Lowpass, 8000.0);
        p.process(&pcm(&[(0, 0)]));
        p.disable_filter();
        p.process(&pcm(&[(0, 0)]));

        let timeouts = handle.timeouts();
        let expected = WriteTimeouts::default();
        assert_eq!(
            timeouts,
            vec![expected.unfiltered, expected.filtered, expected.unfiltered]
        );
    }

    #[test]
    fn test_filtered_path_attenuates_above_cutoff() {
        let (mut p, handle) = capture_pipeline(44100);
        p.enable_filter(FilterType::Lowpass, 500.0);
        // Nyquist-rate square wave, far above the cutoff
        let input: Vec<(i16, i16)> = (0..2000)
            .map(|i| if i % 2 == 0 { (10000, 10000) } else { (-10000, -10000) })
            .collect();
        p.process(&pcm(&input));
        let tail_peak = handle.frames()[1000..]
            .iter()
            .map(|f| f.slots[0].unsigned_abs())
            .max()
            .unwrap();
        assert!(tail_peak < 10, "peak {tail_peak}");
    }

    #[test]
    fn test_sample_rate_change_reaches_transport_and_config() {
        let (mut p, handle) = capture_pipeline(44100);
        p.enable_filter(FilterType::Highpass, 100.0);
        p.set_sample_rate(22050).unwrap();
        p.set_sample_rate(0).unwrap();

        assert_eq!(handle.sample_rates(), vec![44100, 22050]);
        assert_eq!(p.config().sample_rate(), 22050);
        assert_eq!(p.filters().cutoff_hz(FilterType::Highpass), 100.0);
    }

    #[test]
    fn test_config_volume_rejects_nan() {
        let config = PipelineConfig::default();
        config.set_volume(f32::NAN);
        assert_eq!(config.volume(), 0.0);
    }
}
