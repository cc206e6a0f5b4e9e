//! Transport that renders frames to a 16-bit stereo WAV file.

use crate::transport::{OutputTransport, TransportError};
use crate::{Error, Result};
use ampfront_core::AudioFrame;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SAMPLE_RATE: u32 = 44100;

enum Sink {
    /// File created, header not yet written.
    Pending(BufWriter<File>),
    Writing(WavWriter<BufWriter<File>>),
    Finished,
}

/// Writes every frame to a WAV file.
///
/// The WAV header is written when the first frame arrives, so the sample rate
/// may be changed freely until then. Changing it afterwards is rejected since
/// a WAV file carries a single rate.
pub struct WavFileTransport {
    path: PathBuf,
    sink: Sink,
    sample_rate: u32,
    frames_written: u64,
}

impl WavFileTransport {
    /// Creates (or truncates) the output file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| Error::open(&path, e))?;
        Ok(Self {
            path,
            sink: Sink::Pending(BufWriter::new(file)),
            sample_rate: DEFAULT_SAMPLE_RATE,
            frames_written: 0,
        })
    }

    /// Output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn spec(&self) -> WavSpec {
        WavSpec {
            channels: 2,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    /// Starts the WAV writer if it has not been started yet.
    fn writer(
        &mut self,
    ) -> std::result::Result<&mut WavWriter<BufWriter<File>>, TransportError> {
        if matches!(self.sink, Sink::Pending(_)) {
            let spec = self.spec();
            if let Sink::Pending(file) = std::mem::replace(&mut self.sink, Sink::Finished) {
                self.sink = Sink::Writing(WavWriter::new(file, spec).map_err(device_error)?);
            }
        }
        match &mut self.sink {
            Sink::Writing(writer) => Ok(writer),
            _ => Err(TransportError::Closed),
        }
    }

    /// Completes the WAV header and closes the file.
    ///
    /// A file that received no frames is still written as a valid, empty WAV.
    /// Returns the number of frames in the file.
    pub fn finalize(mut self) -> Result<u64> {
        self.finish()?;
        Ok(self.frames_written)
    }

    fn finish(&mut self) -> Result<()> {
        if matches!(self.sink, Sink::Finished) {
            return Ok(());
        }
        self.writer()?;
        if let Sink::Writing(writer) = std::mem::replace(&mut self.sink, Sink::Finished) {
            writer.finalize()?;
        }
        tracing::debug!(
            path = %self.path.display(),
            frames = self.frames_written,
            "WAV output finalized"
        );
        Ok(())
    }
}

impl Drop for WavFileTransport {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to finalize WAV output");
        }
    }
}

fn device_error(err: hound::Error) -> TransportError {
    TransportError::Device(err.to_string())
}

impl OutputTransport for WavFileTransport {
    fn name(&self) -> &str {
        "wav"
    }

    fn write_frame(
        &mut self,
        frame: AudioFrame,
        _: Duration,
    ) -> std::result::Result<usize, TransportError> {
        let writer = self.writer()?;
        writer.write_sample(frame.slots[0]).map_err(device_error)?;
        writer.write_sample(frame.slots[1]).map_err(device_error)?;
        self.frames_written += 1;
        Ok(AudioFrame::BYTES)
    }

    fn set_sample_rate(&mut self, sample_rate: u32) -> std::result::Result<(), TransportError> {
        match self.sink {
            Sink::Pending(_) => {
                self.sample_rate = sample_rate;
                Ok(())
            }
            _ if sample_rate == self.sample_rate => Ok(()),
            _ => Err(TransportError::Device(format!(
                "cannot change WAV sample rate from {} to {} after writing has started",
                self.sample_rate, sample_rate
            ))),
        }
    }

    fn flush(&mut self) -> std::result::Result<(), TransportError> {
        match &mut self.sink {
            Sink::Writing(writer) => writer.flush().map_err(device_error),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampfront_core::AudioSource;
    use tempfile::NamedTempFile;

    #[test]
    fn test_writes_frames_at_configured_rate() {
        let tmp = NamedTempFile::new().unwrap();
        let mut t = WavFileTransport::create(tmp.path()).unwrap();
        t.set_sample_rate(22050).unwrap();
        for i in 0..10i16 {
            let frame = AudioFrame::from_computed(i, -i, AudioSource::Wireless);
            t.write_frame(frame, Duration::ZERO).unwrap();
        }
        assert_eq!(t.finalize().unwrap(), 10);

        let mut reader = hound::WavReader::open(tmp.path()).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 20);
        assert_eq!(&samples[..4], &[0, 0, 1, -1]);
    }

    #[test]
    fn test_rate_change_after_write_is_rejected() {
        let tmp = NamedTempFile::new().unwrap();
        let mut t = WavFileTransport::create(tmp.path()).unwrap();
        t.write_frame(AudioFrame::new(1, 1), Duration::ZERO).unwrap();
        assert!(t.set_sample_rate(DEFAULT_SAMPLE_RATE).is_ok());
        assert!(matches!(
            t.set_sample_rate(8000),
            Err(TransportError::Device(_))
        ));
    }

    #[test]
    fn test_empty_output_is_valid_wav() {
        let tmp = NamedTempFile::new().unwrap();
        let t = WavFileTransport::create(tmp.path()).unwrap();
        assert_eq!(t.finalize().unwrap(), 0);
        let reader = hound::WavReader::open(tmp.path()).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn test_drop_finalizes_header() {
        let tmp = NamedTempFile::new().unwrap();
        {
            let mut t = WavFileTransport::create(tmp.path()).unwrap();
            for _ in 0..3 {
                t.write_frame(AudioFrame::new(7, -7), Duration::ZERO).unwrap();
            }
        }
        let reader = hound::WavReader::open(tmp.path()).unwrap();
        assert_eq!(reader.len(), 6);
    }

    #[test]
    fn test_create_in_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = WavFileTransport::create(dir.path().join("no/such/dir/out.wav"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Open { .. }));
    }
}
