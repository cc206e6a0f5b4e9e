//! Output transport abstraction.
//!
//! The pipeline hands each routed [`AudioFrame`] to an [`OutputTransport`] with
//! a bounded timeout. A transport may deliver the frame to a device, a file, a
//! channel, or nowhere. Transports never block longer than the timeout they
//! are given.

use ampfront_core::AudioFrame;
use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TryRecvError, bounded};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

/// Failure to deliver a frame or apply a transport setting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The transport did not accept the frame within the timeout.
    #[error("write timed out after {0:?}")]
    Timeout(Duration),

    /// Only part of the frame was accepted.
    #[error("partial write: {written} of {expected} bytes")]
    Partial {
        /// Bytes accepted.
        written: usize,
        /// Bytes offered.
        expected: usize,
    },

    /// The consumer side has gone away.
    #[error("transport closed")]
    Closed,

    /// Device or file level failure.
    #[error("device error: {0}")]
    Device(String),
}

/// Sink for interleaved 16-bit stereo frames.
pub trait OutputTransport: Send {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Delivers one frame, waiting at most `timeout`.
    ///
    /// Returns the number of bytes accepted, normally [`AudioFrame::BYTES`].
    fn write_frame(
        &mut self,
        frame: AudioFrame,
        timeout: Duration,
    ) -> Result<usize, TransportError>;

    /// Reconfigures the output clock.
    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), TransportError>;

    /// Pushes any buffered frames to the destination.
    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<T: OutputTransport + ?Sized> OutputTransport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn write_frame(
        &mut self,
        frame: AudioFrame,
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        (**self).write_frame(frame, timeout)
    }

    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), TransportError> {
        (**self).set_sample_rate(sample_rate)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }
}

/// Discards frames, counting them.
#[derive(Debug, Default)]
pub struct NullTransport {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl NullTransport {
    /// Creates a transport that accepts and drops every frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared counter of accepted frames.
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.frames)
    }

    /// Last sample rate applied.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl OutputTransport for NullTransport {
    fn name(&self) -> &str {
        "null"
    }

    fn write_frame(&mut self, _: AudioFrame, _: Duration) -> Result<usize, TransportError> {
        self.frames.fetch_add(1, Ordering::Relaxed);
        Ok(AudioFrame::BYTES)
    }

    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), TransportError> {
        self.sample_rate = sample_rate;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Captured {
    frames: Vec<AudioFrame>,
    sample_rates: Vec<u32>,
    timeouts: Vec<Duration>,
}

/// Records every frame in memory for inspection through a [`CaptureHandle`].
#[derive(Debug)]
pub struct CaptureTransport {
    shared: Arc<Mutex<Captured>>,
}

/// Read side of a [`CaptureTransport`].
#[derive(Debug, Clone)]
pub struct CaptureHandle {
    shared: Arc<Mutex<Captured>>,
}

impl CaptureTransport {
    /// Creates a capturing transport and the handle that observes it.
    pub fn new() -> (Self, CaptureHandle) {
        let shared = Arc::new(Mutex::new(Captured::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            CaptureHandle { shared },
        )
    }
}

impl OutputTransport for CaptureTransport {
    fn name(&self) -> &str {
        "capture"
    }

    fn write_frame(
        &mut self,
        frame: AudioFrame,
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        let mut captured = self.shared.lock();
        captured.frames.push(frame);
        captured.timeouts.push(timeout);
        Ok(AudioFrame::BYTES)
    }

    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), TransportError> {
        self.shared.lock().sample_rates.push(sample_rate);
        Ok(())
    }
}

impl CaptureHandle {
    /// Copy of every frame written so far.
    pub fn frames(&self) -> Vec<AudioFrame> {
        self.shared.lock().frames.clone()
    }

    /// Number of frames written so far.
    pub fn frame_count(&self) -> usize {
        self.shared.lock().frames.len()
    }

    /// Sample rates applied, in order.
    pub fn sample_rates(&self) -> Vec<u32> {
        self.shared.lock().sample_rates.clone()
    }

    /// Timeout passed with each frame, in order.
    pub fn timeouts(&self) -> Vec<Duration> {
        self.shared.lock().timeouts.clone()
    }

    /// Drops all captured data.
    pub fn clear(&self) {
        let mut captured = self.shared.lock();
        captured.frames.clear();
        captured.sample_rates.clear();
        captured.timeouts.clear();
    }
}

/// Sends frames over a bounded channel, blocking up to the write timeout when
/// the consumer falls behind.
#[derive(Debug)]
pub struct ChannelTransport {
    tx: Sender<AudioFrame>,
    sample_rate: Arc<AtomicU32>,
}

/// Consumer side of a [`ChannelTransport`].
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    rx: Receiver<AudioFrame>,
    sample_rate: Arc<AtomicU32>,
}

impl ChannelTransport {
    /// Creates a transport buffering at most `capacity` frames.
    pub fn new(capacity: usize, sample_rate: u32) -> (Self, FrameReceiver) {
        let (tx, rx) = bounded(capacity);
        let sample_rate = Arc::new(AtomicU32::new(sample_rate));
        (
            Self {
                tx,
                sample_rate: Arc::clone(&sample_rate),
            },
            FrameReceiver { rx, sample_rate },
        )
    }
}

impl OutputTransport for ChannelTransport {
    fn name(&self) -> &str {
        "channel"
    }

    fn write_frame(
        &mut self,
        frame: AudioFrame,
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        match self.tx.send_timeout(frame, timeout) {
            Ok(()) => Ok(AudioFrame::BYTES),
            Err(SendTimeoutError::Timeout(_)) => Err(TransportError::Timeout(timeout)),
            Err(SendTimeoutError::Disconnected(_)) => Err(TransportError::Closed),
        }
    }

    fn set_sample_rate(&mut self, sample_rate: u32) -> Result<(), TransportError> {
        self.sample_rate.store(sample_rate, Ordering::Release);
        Ok(())
    }
}

impl FrameReceiver {
    /// Takes the next frame if one is queued.
    pub fn try_recv(&self) -> Option<AudioFrame> {
        match self.rx.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Waits up to `timeout` for the next frame.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<AudioFrame> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Frames currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no frames are queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Sample rate most recently applied by the sender.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Acquire)
    }
}
