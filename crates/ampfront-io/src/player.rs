//! File playback state machine.
//!
//! A [`PlaybackController`] owns one background worker that pumps payload
//! chunks from a [`WaveformReader`] into the shared pipeline. Commands and the
//! worker meet on a mutex-guarded control block; every state change is
//! signalled on a condition variable, so a paused worker sleeps until it is
//! resumed or stopped instead of polling.
//!
//! ```text
//!            play                  pause
//! Stopped ─────────▶ Playing ◀─────────▶ Paused
//!    ▲                  │      resume      │
//!    └──────────────────┴──────────────────┘
//!      stop / end of data / read error
//! ```
//!
//! The worker checks the state between chunks. Stopping never interrupts a
//! transport write in flight; it takes effect at the next chunk boundary.

use crate::pipeline::SharedPipeline;
use crate::wav::{WaveformHeader, WaveformReader};
use crate::{Error, Result};
use ampfront_core::AudioFrame;
use parking_lot::{Condvar, Mutex};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No file is being played.
    #[default]
    Stopped,
    /// The worker is feeding chunks.
    Playing,
    /// The worker is holding its position.
    Paused,
}

impl PlaybackState {
    /// Lowercase name for display.
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }
}

/// A command that does not apply in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// `pause` while not playing.
    #[error("not playing")]
    NotPlaying,
    /// `resume` while not paused.
    #[error("not paused")]
    NotPaused,
}

/// Counters for the current (or last) file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Chunks handed to the pipeline.
    pub chunks_fed: u64,
    /// Payload bytes handed to the pipeline.
    pub bytes_fed: u64,
    /// Frames the transport accepted.
    pub frames_written: u64,
    /// Frames the transport dropped.
    pub frames_dropped: u64,
}

/// Playback tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Payload bytes read and fed per chunk. Rounded down to whole stereo
    /// frames, at least one.
    pub chunk_size: usize,
    /// Pause after an implicit stop so in-flight writes can drain.
    pub settle_delay: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            settle_delay: Duration::from_millis(10),
        }
    }
}

type BoxedReader = WaveformReader<Box<dyn Read + Send>>;

#[derive(Default)]
struct Control {
    state: PlaybackState,
    /// Reader waiting to be picked up by the worker.
    pending: Option<BoxedReader>,
    /// The worker holds a reader.
    busy: bool,
    shutdown: bool,
    stats: PlaybackStats,
    last_error: Option<Error>,
}

struct Shared {
    control: Mutex<Control>,
    changed: Condvar,
}

impl Shared {
    fn set_state(&self, control: &mut Control, state: PlaybackState) {
        if control.state != state {
            tracing::debug!(from = control.state.as_str(), to = state.as_str(), "playback state");
            control.state = state;
        }
        self.changed.notify_all();
    }
}

/// Streams waveform files through a shared pipeline from a background worker.
pub struct PlaybackController {
    shared: Arc<Shared>,
    /// Held across the implicit stop and the start of a `play`.
    commands: Mutex<()>,
    pipeline: SharedPipeline,
    config: PlayerConfig,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackController {
    /// Starts the worker thread. The controller begins `Stopped`.
    pub fn new(pipeline: SharedPipeline, mut config: PlayerConfig) -> Result<Self> {
        let chunk_size = whole_frames(config.chunk_size);
        if chunk_size != config.chunk_size {
            tracing::debug!(requested = config.chunk_size, chunk_size, "chunk size aligned");
            config.chunk_size = chunk_size;
        }

        let shared = Arc::new(Shared {
            control: Mutex::new(Control::default()),
            changed: Condvar::new(),
        });

        let worker = {
            let shared = Arc::clone(&shared);
            let pipeline = Arc::clone(&pipeline);
            std::thread::Builder::new()
                .name("ampfront-player".to_string())
                .spawn(move || run_worker(&shared, &pipeline, chunk_size))?
        };

        Ok(Self {
            shared,
            commands: Mutex::new(()),
            pipeline,
            config,
            worker: Some(worker),
        })
    }

    /// Playback tuning in use.
    pub fn config(&self) -> PlayerConfig {
        self.config
    }

    /// Opens and parses `path`, then starts playing it.
    ///
    /// Anything already playing is stopped first. If the file cannot be
    /// opened or parsed the controller stays `Stopped` and the error is
    /// returned; [`Error::is_unplayable`] is true for it.
    pub fn play<P: AsRef<Path>>(&self, path: P) -> Result<WaveformHeader> {
        let path = path.as_ref();
        let _command = self.commands.lock();
        self.stop_and_settle();
        let reader = WaveformReader::open(path).inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "unplayable file");
        })?;
        tracing::info!(path = %path.display(), "playing");
        self.start(reader.boxed())
    }

    /// Like [`play`](Self::play) for an already open byte source.
    pub fn play_reader<R: Read + Send + 'static>(&self, reader: R) -> Result<WaveformHeader> {
        let _command = self.commands.lock();
        self.stop_and_settle();
        let reader = WaveformReader::from_reader(reader).inspect_err(|e| {
            tracing::warn!(error = %e, "unplayable stream");
        })?;
        self.start(reader.boxed())
    }

    fn start(&self, reader: BoxedReader) -> Result<WaveformHeader> {
        let header = *reader.header();
        {
            let mut pipeline = self.pipeline.lock();
            pipeline.set_sample_rate(header.sample_rate)?;
            pipeline.reset_filters();
        }
        tracing::debug!(
            sample_rate = header.sample_rate,
            channels = header.channels,
            bits = header.bits_per_sample,
            data_size = header.data_size,
            "header parsed"
        );

        let mut control = self.shared.control.lock();
        control.pending = Some(reader);
        control.stats = PlaybackStats::default();
        control.last_error = None;
        self.shared.set_state(&mut control, PlaybackState::Playing);
        Ok(header)
    }

    /// Stops anything in progress and waits until the worker has let go of
    /// its file.
    fn stop_and_settle(&self) {
        let was_active = {
            let mut control = self.shared.control.lock();
            let active = control.state != PlaybackState::Stopped || control.busy;
            control.pending = None;
            self.shared.set_state(&mut control, PlaybackState::Stopped);
            active
        };
        if was_active {
            std::thread::sleep(self.config.settle_delay);
            let mut control = self.shared.control.lock();
            self.shared
                .changed
                .wait_while(&mut control, |c| c.busy && !c.shutdown);
        }
    }

    /// Holds the current position.
    pub fn pause(&self) -> std::result::Result<(), PlaybackError> {
        let mut control = self.shared.control.lock();
        if control.state != PlaybackState::Playing {
            return Err(PlaybackError::NotPlaying);
        }
        self.shared.set_state(&mut control, PlaybackState::Paused);
        Ok(())
    }

    /// Continues from a pause.
    pub fn resume(&self) -> std::result::Result<(), PlaybackError> {
        let mut control = self.shared.control.lock();
        if control.state != PlaybackState::Paused {
            return Err(PlaybackError::NotPaused);
        }
        self.shared.set_state(&mut control, PlaybackState::Playing);
        Ok(())
    }

    /// Ends playback. The worker releases the file at the next chunk
    /// boundary. Stopping while stopped does nothing.
    pub fn stop(&self) {
        let mut control = self.shared.control.lock();
        if control.state != PlaybackState::Stopped {
            tracing::info!("playback stopped");
        }
        control.pending = None;
        self.shared.set_state(&mut control, PlaybackState::Stopped);
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.shared.control.lock().state
    }

    /// Whether the state is `Stopped`.
    pub fn is_stopped(&self) -> bool {
        self.state() == PlaybackState::Stopped
    }

    /// Whether the worker holds no file and none is queued.
    pub fn is_idle(&self) -> bool {
        let control = self.shared.control.lock();
        !control.busy && control.pending.is_none()
    }

    /// Counters for the current or most recent file.
    pub fn stats(&self) -> PlaybackStats {
        self.shared.control.lock().stats
    }

    /// Message of the read error that ended the last file, if any.
    pub fn last_error(&self) -> Option<String> {
        self.shared
            .control
            .lock()
            .last_error
            .as_ref()
            .map(ToString::to_string)
    }

    /// Takes the read error that ended the last file, if any.
    pub fn take_last_error(&self) -> Option<Error> {
        self.shared.control.lock().last_error.take()
    }

    /// Blocks until playback is stopped and the worker is idle, or `timeout`
    /// passes. Returns whether that point was reached.
    pub fn wait_until_stopped(&self, timeout: Duration) -> bool {
        let mut control = self.shared.control.lock();
        self.shared.changed.wait_while_for(
            &mut control,
            |c| c.state != PlaybackState::Stopped || c.busy || c.pending.is_some(),
            timeout,
        );
        control.state == PlaybackState::Stopped && !control.busy && control.pending.is_none()
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        {
            let mut control = self.shared.control.lock();
            control.shutdown = true;
            control.pending = None;
            self.shared.set_state(&mut control, PlaybackState::Stopped);
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("playback worker panicked");
        }
    }
}

/// Largest multiple of the frame size not above `bytes`, at least one frame.
fn whole_frames(bytes: usize) -> usize {
    (bytes / AudioFrame::BYTES).max(1) * AudioFrame::BYTES
}

enum Ended {
    Stopped,
    EndOfData,
    ReadFailed(std::io::Error),
}

fn run_worker(shared: &Shared, pipeline: &SharedPipeline, chunk_size: usize) {
    let mut buf = vec![0u8; chunk_size];

    loop {
        let mut reader = {
            let mut control = shared.control.lock();
            loop {
                if control.shutdown {
                    return;
                }
                if let Some(reader) = control.pending.take() {
                    control.busy = true;
                    break reader;
                }
                shared.changed.wait(&mut control);
            }
        };

        let ended = feed(shared, pipeline, &mut reader, &mut buf);
        drop(reader);
        if matches!(ended, Ended::EndOfData)
            && let Err(e) = pipeline.lock().flush()
        {
            tracing::debug!(error = %e, "transport flush failed");
        }

        let mut control = shared.control.lock();
        control.busy = false;
        match ended {
            Ended::Stopped => {}
            Ended::EndOfData => {
                tracing::info!(
                    chunks = control.stats.chunks_fed,
                    bytes = control.stats.bytes_fed,
                    "end of data"
                );
            }
            Ended::ReadFailed(e) => {
                tracing::warn!(error = %e, "read failed mid-stream");
                control.last_error = Some(Error::Io(e));
            }
        }
        shared.set_state(&mut control, PlaybackState::Stopped);
    }
}

/// Feeds chunks until the state leaves `Playing` or the payload runs out.
fn feed(
    shared: &Shared,
    pipeline: &SharedPipeline,
    reader: &mut BoxedReader,
    buf: &mut [u8],
) -> Ended {
    loop {
        {
            let mut control = shared.control.lock();
            shared.changed.wait_while(&mut control, |c| {
                c.state == PlaybackState::Paused && !c.shutdown
            });
            if control.state == PlaybackState::Stopped || control.shutdown {
                return Ended::Stopped;
            }
        }

        let n = match reader.read_chunk(buf) {
            Ok(0) => return Ended::EndOfData,
            Ok(n) => n,
            Err(e) => return Ended::ReadFailed(e),
        };

        let fed = pipeline.lock().process(&buf[..n]);

        {
            let mut control = shared.control.lock();
            control.stats.chunks_fed += 1;
            control.stats.bytes_fed += n as u64;
            control.stats.frames_written += fed.frames_written as u64;
            control.stats.frames_dropped += fed.frames_dropped as u64;
        }

        if n < buf.len() {
            return Ended::EndOfData;
        }
    }
}
