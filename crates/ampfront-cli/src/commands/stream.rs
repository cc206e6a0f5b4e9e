//! Feed raw PCM packets straight into the pipeline, as the wireless link does.

use super::common::{OutputArgs, build_frontend, check_settings, interrupt_flag, load_settings};
use ampfront_core::AudioSource;
use ampfront_io::FeedStats;
use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

#[derive(Args)]
pub struct StreamArgs {
    /// Raw interleaved 16-bit little-endian stereo PCM (`-` or omitted for stdin)
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Bytes per packet
    #[arg(long, default_value_t = 512)]
    packet_size: usize,

    /// Sample rate of the stream in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    #[command(flatten)]
    output: OutputArgs,

    /// Volume on the 0-9 scale (5 is unity)
    #[arg(long)]
    volume: Option<i32>,

    /// Swap left and right
    #[arg(long)]
    swap: bool,

    /// Settings file (defaults to the user settings file)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn open_input(input: Option<&PathBuf>) -> anyhow::Result<Box<dyn Read>> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            let file =
                File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            Ok(Box::new(io::BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

/// Reads until `buf` is full or the input ends.
fn read_packet(input: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub fn run(args: StreamArgs) -> anyhow::Result<()> {
    if args.packet_size == 0 {
        anyhow::bail!("packet size must be non-zero");
    }

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(rate) = args.sample_rate {
        settings.sample_rate = rate;
    }
    if let Some(volume) = args.volume {
        settings.volume = volume;
    }
    check_settings(&settings)?;

    let transport = args.output.open(settings.sample_rate)?;
    let frontend = build_frontend(&settings, transport)?;
    frontend.set_active_source(AudioSource::Wireless);
    if args.swap {
        frontend.reverse_channels();
    }

    let mut input = open_input(args.input.as_ref())?;
    let running = interrupt_flag()?;
    let mut buf = vec![0u8; args.packet_size];
    let mut total = FeedStats::default();
    let mut packets = 0u64;

    while running.load(Ordering::SeqCst) {
        let n = read_packet(&mut *input, &mut buf)?;
        if n == 0 {
            break;
        }
        total += frontend.feed_stream(&buf[..n]);
        packets += 1;
        if n < buf.len() {
            break;
        }
    }

    if let Err(e) = frontend.pipeline().lock().flush() {
        tracing::warn!(error = %e, "output flush failed");
    }
    println!(
        "Streamed {} packets: {} frames written, {} dropped, {} trailing bytes ignored",
        packets, total.frames_written, total.frames_dropped, total.ignored_bytes
    );
    Ok(())
}
