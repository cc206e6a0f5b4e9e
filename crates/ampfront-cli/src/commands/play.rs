//! Play a WAV file through the pipeline and playback controller.

use super::common::{OutputArgs, build_frontend, check_settings, interrupt_flag, load_settings};
use clap::Args;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

#[derive(Args)]
pub struct PlayArgs {
    /// WAV file to play
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    /// Volume on the 0-9 scale (5 is unity)
    #[arg(long)]
    volume: Option<i32>,

    /// Enable filtering with this low-pass cutoff in Hz
    #[arg(long, value_name = "HZ")]
    lowpass: Option<f32>,

    /// Enable filtering with this high-pass cutoff in Hz
    #[arg(long, value_name = "HZ")]
    highpass: Option<f32>,

    /// Swap left and right
    #[arg(long)]
    swap: bool,

    /// Payload bytes fed per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Settings file (defaults to the user settings file)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(volume) = args.volume {
        settings.volume = volume;
    }
    if let Some(hz) = args.lowpass {
        settings.filter.enabled = true;
        settings.filter.lowpass_hz = hz;
    }
    if let Some(hz) = args.highpass {
        settings.filter.enabled = true;
        settings.filter.highpass_hz = hz;
    }
    if let Some(chunk_size) = args.chunk_size {
        settings.playback.chunk_size = chunk_size;
    }
    check_settings(&settings)?;

    let transport = args.output.open(settings.sample_rate)?;
    let frontend = build_frontend(&settings, transport)?;
    if args.swap {
        frontend.reverse_channels();
    }

    let header = frontend.play(&args.file)?;
    println!("Playing {}", args.file.display());
    println!(
        "  {} Hz, {} ch, {}-bit, {:.1}s",
        header.sample_rate,
        header.channels,
        header.bits_per_sample,
        header.duration_secs()
    );

    let running = interrupt_flag()?;
    while !frontend.player().wait_until_stopped(Duration::from_millis(100)) {
        if !running.load(Ordering::SeqCst) {
            frontend.stop();
        }
    }

    let stats = frontend.player().stats();
    if let Some(error) = frontend.player().take_last_error() {
        anyhow::bail!("playback ended early: {error}");
    }
    println!(
        "Done: {} chunks, {} bytes, {} frames dropped",
        stats.chunks_fed, stats.bytes_fed, stats.frames_dropped
    );
    Ok(())
}
