//! One object for both input paths and the control surface.

use crate::library::TrackList;
use crate::pipeline::{FeedStats, PipelineConfig, SampleTransformPipeline, SharedPipeline};
use crate::player::{PlaybackController, PlaybackError, PlaybackState, PlayerConfig};
use crate::transport::OutputTransport;
use crate::wav::WaveformHeader;
use crate::{Error, Result};
use ampfront_core::{AudioSource, FilterType};
use std::path::Path;
use std::sync::Arc;

/// The audio front-end: a shared pipeline fed either by streaming packets or
/// by the playback controller.
///
/// All control methods take `&self` and may be called from any thread.
pub struct AudioFrontend {
    config: Arc<PipelineConfig>,
    pipeline: SharedPipeline,
    player: PlaybackController,
}

impl AudioFrontend {
    /// Builds the pipeline on `transport` and starts the playback worker.
    pub fn new(
        config: PipelineConfig,
        transport: Box<dyn OutputTransport>,
        player_config: PlayerConfig,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let pipeline = SampleTransformPipeline::new(Arc::clone(&config), transport)?.into_shared();
        let player = PlaybackController::new(Arc::clone(&pipeline), player_config)?;
        Ok(Self {
            config,
            pipeline,
            player,
        })
    }

    /// Sets the volume on the 0-9 scale. Out-of-range values are clamped.
    pub fn set_volume(&self, scale: i32) {
        self.config.set_volume_scale(scale as f32);
        tracing::debug!(scale, multiplier = self.config.volume(), "volume set");
    }

    /// Designs and enables the filter pair for `filter_type`.
    ///
    /// Cutoffs outside 2 Hz to 20 kHz are clamped.
    pub fn enable_filter(&self, filter_type: FilterType, cutoff_hz: f32) {
        self.pipeline.lock().enable_filter(filter_type, cutoff_hz);
    }

    /// Bypasses the filter banks.
    pub fn disable_filter(&self) {
        self.pipeline.lock().disable_filter();
    }

    /// Selects the active source, which sets the channel routing.
    pub fn set_active_source(&self, source: AudioSource) {
        self.config.set_source(source);
        tracing::debug!(source = source.as_str(), "active source set");
    }

    /// Swaps left and right by flipping the routing.
    pub fn reverse_channels(&self) -> AudioSource {
        self.config.reverse_source()
    }

    /// Streaming entry point: feeds one packet of interleaved PCM.
    pub fn feed_stream(&self, bytes: &[u8]) -> FeedStats {
        self.pipeline.lock().process(bytes)
    }

    /// Changes the output sample rate for the streaming path.
    pub fn set_sample_rate(&self, sample_rate: u32) -> Result<()> {
        self.pipeline.lock().set_sample_rate(sample_rate)?;
        Ok(())
    }

    /// Plays a waveform file. See [`PlaybackController::play`].
    pub fn play<P: AsRef<Path>>(&self, path: P) -> Result<WaveformHeader> {
        self.player.play(path)
    }

    /// Plays the track selected in `tracks`.
    ///
    /// Fails with [`Error::NoTrackSelected`] if the list has no selection.
    pub fn play_selected(&self, tracks: &TrackList) -> Result<WaveformHeader> {
        let path = tracks.selected().ok_or(Error::NoTrackSelected)?;
        self.player.play(path)
    }

    /// Pauses file playback.
    pub fn pause(&self) -> std::result::Result<(), PlaybackError> {
        self.player.pause()
    }

    /// Resumes file playback.
    pub fn resume(&self) -> std::result::Result<(), PlaybackError> {
        self.player.resume()
    }

    /// Stops file playback.
    pub fn stop(&self) {
        self.player.stop();
    }

    /// Whether file playback is stopped.
    pub fn is_stopped(&self) -> bool {
        self.player.is_stopped()
    }

    /// File playback state.
    pub fn state(&self) -> PlaybackState {
        self.player.state()
    }

    /// The playback controller.
    pub fn player(&self) -> &PlaybackController {
        &self.player
    }

    /// The shared pipeline.
    pub fn pipeline(&self) -> &SharedPipeline {
        &self.pipeline
    }

    /// The shared tunables.
    pub fn config(&self) -> &Arc<PipelineConfig> {
        &self.config
    }
}
