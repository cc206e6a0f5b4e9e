//! ampfront CLI - drive the audio front-end from the command line.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ampfront")]
#[command(author, version, about = "Audio front-end: WAV playback and PCM streaming", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the header of a WAV file
    Info(commands::info::InfoArgs),

    /// Play a WAV file through the pipeline
    Play(commands::play::PlayArgs),

    /// Feed raw interleaved PCM packets through the pipeline
    Stream(commands::stream::StreamArgs),

    /// List the tracks under a music root
    Tracks(commands::tracks::TracksArgs),

    /// List output devices
    Devices,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Play(args) => commands::play::run(args),
        Commands::Stream(args) => commands::stream::run(args),
        Commands::Tracks(args) => commands::tracks::run(args),
        Commands::Devices => commands::devices(),
    }
}
