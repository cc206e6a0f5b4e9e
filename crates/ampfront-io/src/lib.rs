//! Audio I/O layer for the ampfront audio front-end.
//!
//! This crate provides:
//!
//! - **Waveform parsing**: [`parse_header`] and [`WaveformReader`] for chunked
//!   RIFF/WAVE files with tolerant data-chunk location
//! - **Sample pipeline**: [`SampleTransformPipeline`] applying volume, routing and
//!   the stereo filter banks before handing frames to an [`OutputTransport`]
//! - **Playback control**: [`PlaybackController`] streaming a file through the
//!   pipeline from a background worker, with play/pause/resume/stop
//! - **Facade**: [`AudioFrontend`] tying both input paths (streaming packets and
//!   file playback) to one shared pipeline
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ampfront_io::{AudioFrontend, PipelineConfig, PlayerConfig, WavFileTransport};
//!
//! let transport = WavFileTransport::create("rendered.wav")?;
//! let frontend = AudioFrontend::new(
//!     PipelineConfig::new(44100),
//!     Box::new(transport),
//!     PlayerConfig::default(),
//! )?;
//! frontend.set_volume(7);
//! frontend.play("/sd/track.wav")?;
//! frontend.player().wait_until_stopped(std::time::Duration::from_secs(600));
//! ```

mod cpal_transport;
mod frontend;
mod library;
mod pipeline;
mod player;
mod transport;
mod wav;
mod wav_transport;

pub use cpal_transport::{CpalTransport, list_output_devices};
pub use frontend::AudioFrontend;
pub use library::TrackList;
pub use pipeline::{FeedStats, PipelineConfig, SampleTransformPipeline, SharedPipeline, WriteTimeouts};
pub use player::{
    PlaybackController, PlaybackError, PlaybackState, PlaybackStats, PlayerConfig,
};
pub use transport::{
    CaptureHandle, CaptureTransport, ChannelTransport, FrameReceiver, NullTransport,
    OutputTransport, TransportError,
};
pub use wav::{
    FormatError, MAX_DATA_SCAN_BYTES, WaveformHeader, WaveformReader, parse_header,
    read_header_info,
};
pub use wav_transport::WavFileTransport;

use std::path::PathBuf;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file is not a playable waveform.
    #[error("unplayable file: {0}")]
    Format(#[from] FormatError),

    /// The file could not be opened.
    #[error("failed to open '{path}': {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Standard I/O error while reading a byte source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV writer error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The output transport rejected a request.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A playback command was not valid in the current state.
    #[error("playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Playback of the selected track was requested but nothing is selected.
    #[error("no track selected")]
    NoTrackSelected,
}

impl Error {
    /// Creates an open error for `path`.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Open {
            path: path.into(),
            source,
        }
    }

    /// Whether the error means the requested file cannot be played.
    ///
    /// True for format, open and read failures; false for configuration,
    /// device and selection problems.
    pub fn is_unplayable(&self) -> bool {
        matches!(self, Error::Format(_) | Error::Open { .. } | Error::Io(_))
    }
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
