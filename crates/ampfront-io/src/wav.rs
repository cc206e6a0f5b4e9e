//! Chunked waveform (RIFF/WAVE) header parsing and payload reading.
//!
//! The header is read field by field from any [`Read`] source:
//!
//! ```text
//! "RIFF" size "WAVE" "fmt " fmt_size
//!     compression:u16 channels:u16 sample_rate:u32 byte_rate:u32
//!     block_align:u16 bits_per_sample:u16 [fmt extension]
//! ... any chunks ... "data" data_size payload
//! ```
//!
//! The data chunk is not assumed to follow the format chunk. After the format
//! chunk the reader slides a four-byte window forward until it sees `data`,
//! which skips any intervening chunks without having to understand them.

use crate::{Error, Result};
use std::fs::File;
use std::io::{self, BufReader, Read, Take};
use std::path::Path;

/// Upper bound on bytes examined while looking for the data chunk.
pub const MAX_DATA_SCAN_BYTES: u64 = 1 << 20;

const RIFF_TAG: &[u8; 4] = b"RIFF";
const WAVE_TAG: &[u8; 4] = b"WAVE";
const FMT_TAG: &[u8; 3] = b"fmt";
const DATA_TAG: &[u8; 4] = b"data";

/// Size of the fixed fields of a PCM format chunk.
const FMT_FIXED_SIZE: u32 = 16;

/// Reasons a byte stream is not a playable waveform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The container tag is not `RIFF`.
    #[error("RIFF descriptor not found (got \"{}\")", .0.escape_ascii())]
    BadContainerTag([u8; 4]),

    /// The format tag is not `WAVE`.
    #[error("WAVE chunk ID not found (got \"{}\")", .0.escape_ascii())]
    BadFormatTag([u8; 4]),

    /// The first sub-chunk is not a `fmt` chunk.
    #[error("fmt chunk not found (got \"{}\")", .0.escape_ascii())]
    BadFormatChunkTag([u8; 4]),

    /// The stream ended inside a fixed header field.
    #[error("header truncated while reading {0}")]
    Truncated(&'static str),

    /// The stream ended before a `data` chunk appeared.
    #[error("no data chunk found")]
    NoDataChunk,

    /// No `data` chunk within [`MAX_DATA_SCAN_BYTES`] of the format chunk.
    #[error("no data chunk within {0} bytes of the format chunk")]
    DataScanLimit(u64),
}

/// Parsed waveform metadata plus the location of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformHeader {
    /// Container tag (`RIFF`).
    pub container_tag: [u8; 4],
    /// Declared container size. Not validated.
    pub container_size: u32,
    /// Format tag (`WAVE`).
    pub format_tag: [u8; 4],
    /// Format sub-chunk tag (`fmt `).
    pub format_chunk_tag: [u8; 4],
    /// Declared format sub-chunk size.
    pub format_size: u32,
    /// Compression code (1 = linear PCM).
    pub compression_code: u16,
    /// Channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Average bytes per second.
    pub byte_rate: u32,
    /// Bytes per sample frame.
    pub block_align: u16,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Offset of the first payload byte from the start of the stream.
    pub data_offset: u64,
    /// Declared payload size in bytes.
    pub data_size: u32,
}

impl WaveformHeader {
    /// Whether the payload is the 16-bit interleaved stereo the pipeline expects.
    pub fn is_pcm16_stereo(&self) -> bool {
        self.compression_code == 1 && self.channels == 2 && self.bits_per_sample == 16
    }

    /// Number of sample frames in the payload, or 0 if `block_align` is 0.
    pub fn frame_count(&self) -> u64 {
        if self.block_align == 0 {
            return 0;
        }
        u64::from(self.data_size) / u64::from(self.block_align)
    }

    /// Payload duration in seconds, or 0.0 if the sample rate is 0.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }
}

/// Read adapter that counts consumed bytes.
struct Counting<R> {
    inner: R,
    position: u64,
}

impl<R: Read> Read for Counting<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

fn field_error(err: io::Error, field: &'static str) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        FormatError::Truncated(field).into()
    } else {
        Error::Io(err)
    }
}

fn read_array<const N: usize>(reader: &mut impl Read, field: &'static str) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader
        .read_exact(&mut buf)
        .map_err(|e| field_error(e, field))?;
    Ok(buf)
}

fn read_u16(reader: &mut impl Read, field: &'static str) -> Result<u16> {
    read_array::<2>(reader, field).map(u16::from_le_bytes)
}

fn read_u32(reader: &mut impl Read, field: &'static str) -> Result<u32> {
    read_array::<4>(reader, field).map(u32::from_le_bytes)
}

/// Reads one byte, `None` at end of stream.
fn read_byte(reader: &mut impl Read) -> Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
    }
}

/// Parses the waveform header from the start of `reader`.
///
/// On success the reader is positioned at the first payload byte. On failure
/// the reader's position is unspecified and it should be discarded.
///
/// # Errors
///
/// - [`FormatError`] for a signature mismatch, truncated header, or missing
///   data chunk
/// - [`Error::Io`] for any other read failure
pub fn parse_header<R: Read>(reader: &mut R) -> Result<WaveformHeader> {
    let mut r = Counting {
        inner: reader,
        position: 0,
    };

    let container_tag = read_array::<4>(&mut r, "container tag")?;
    if &container_tag != RIFF_TAG {
        return Err(FormatError::BadContainerTag(container_tag).into());
    }
    let container_size = read_u32(&mut r, "container size")?;

    let format_tag = read_array::<4>(&mut r, "format tag")?;
    if &format_tag != WAVE_TAG {
        return Err(FormatError::BadFormatTag(format_tag).into());
    }

    let format_chunk_tag = read_array::<4>(&mut r, "format chunk tag")?;
    if &format_chunk_tag[..3] != FMT_TAG {
        return Err(FormatError::BadFormatChunkTag(format_chunk_tag).into());
    }
    let format_size = read_u32(&mut r, "format chunk size")?;

    let compression_code = read_u16(&mut r, "compression code")?;
    let channels = read_u16(&mut r, "channel count")?;
    let sample_rate = read_u32(&mut r, "sample rate")?;
    let byte_rate = read_u32(&mut r, "byte rate")?;
    let block_align = read_u16(&mut r, "block align")?;
    let bits_per_sample = read_u16(&mut r, "bits per sample")?;

    // WAVEFORMATEX / EXTENSIBLE carry extra bytes after the fixed fields
    if format_size > FMT_FIXED_SIZE {
        let extension = u64::from(format_size - FMT_FIXED_SIZE);
        let skipped = io::copy(&mut (&mut r).take(extension), &mut io::sink())?;
        if skipped < extension {
            return Err(FormatError::Truncated("format chunk extension").into());
        }
    }

    let mut window = [0u8; 4];
    let mut scanned: u64 = 0;
    loop {
        if scanned >= MAX_DATA_SCAN_BYTES {
            return Err(FormatError::DataScanLimit(MAX_DATA_SCAN_BYTES).into());
        }
        let Some(byte) = read_byte(&mut r)? else {
            return Err(FormatError::NoDataChunk.into());
        };
        scanned += 1;
        window = [window[1], window[2], window[3], byte];
        if scanned >= 4 && &window == DATA_TAG {
            break;
        }
    }
    let data_size = read_u32(&mut r, "data chunk size")?;

    Ok(WaveformHeader {
        container_tag,
        container_size,
        format_tag,
        format_chunk_tag,
        format_size,
        compression_code,
        channels,
        sample_rate,
        byte_rate,
        block_align,
        bits_per_sample,
        data_offset: r.position,
        data_size,
    })
}

/// A parsed waveform positioned on its payload.
///
/// Reads never go past the declared payload size, so chunks trailing the
/// data chunk are never returned as audio.
pub struct WaveformReader<R> {
    header: WaveformHeader,
    payload: Take<R>,
}

impl WaveformReader<BufReader<File>> {
    /// Opens and parses a waveform file.
    ///
    /// # Errors
    ///
    /// [`Error::Open`] if the file cannot be opened, otherwise any error of
    /// [`parse_header`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::open(path, e))?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read> WaveformReader<R> {
    /// Parses the header from `reader` and positions on the payload.
    pub fn from_reader(mut reader: R) -> Result<Self> {
        let header = parse_header(&mut reader)?;
        if !header.is_pcm16_stereo() {
            tracing::warn!(
                compression = header.compression_code,
                channels = header.channels,
                bits = header.bits_per_sample,
                "payload is not 16-bit stereo PCM; it will be played as such"
            );
        }
        let payload = reader.take(u64::from(header.data_size));
        Ok(Self { header, payload })
    }

    /// The parsed header.
    pub fn header(&self) -> &WaveformHeader {
        &self.header
    }

    /// Payload bytes not yet read.
    pub fn remaining(&self) -> u64 {
        self.payload.limit()
    }

    /// Fills `buf` from the payload.
    ///
    /// Returns fewer than `buf.len()` bytes only at the end of the payload
    /// (or of the underlying stream), and 0 once it is exhausted.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.payload.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    /// Boxes the underlying source so readers of different kinds can share a
    /// queue.
    pub fn boxed(self) -> WaveformReader<Box<dyn Read + Send>>
    where
        R: Send + 'static,
    {
        let limit = self.payload.limit();
        let inner: Box<dyn Read + Send> = Box::new(self.payload.into_inner());
        WaveformReader {
            header: self.header,
            payload: inner.take(limit),
        }
    }
}

/// Reads only the header of a waveform file.
pub fn read_header_info<P: AsRef<Path>>(path: P) -> Result<WaveformHeader> {
    WaveformReader::open(path).map(|reader| *reader.header())
}
