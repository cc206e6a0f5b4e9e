//! List the WAV tracks under a music root.

use super::common::load_settings;
use ampfront_io::TrackList;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct TracksArgs {
    /// Music root (defaults to the configured one)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Settings file (defaults to the user settings file)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

pub fn run(args: TracksArgs) -> anyhow::Result<()> {
    let root = match args.dir {
        Some(dir) => dir,
        None => load_settings(args.config.as_deref())?.playback.music_root,
    };
    let tracks = TrackList::scan(&root)?;

    if tracks.is_empty() {
        println!("No tracks under {}", root.display());
        return Ok(());
    }

    println!("Tracks under {}", root.display());
    for (idx, track) in tracks.tracks().iter().enumerate() {
        let marker = if tracks.selected_index() == Some(idx) {
            '*'
        } else {
            ' '
        };
        println!(" {marker}[{idx}] /{}", track.display());
    }
    Ok(())
}
