//! Display the parsed header of a WAV file.

use ampfront_io::read_header_info;
use clap::Args;
use std::path::PathBuf;

/// Display WAV header information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the WAV file
    pub file: PathBuf,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let header = read_header_info(&args.file)?;

    let format = if header.compression_code == 1 {
        "PCM".to_string()
    } else {
        format!("compression code {}", header.compression_code)
    };

    println!("File:        {}", args.file.display());
    println!(
        "Tags:        {} / {} / {}",
        header.container_tag.escape_ascii(),
        header.format_tag.escape_ascii(),
        header.format_chunk_tag.escape_ascii()
    );
    println!("Format:      {} {}-bit", format, header.bits_per_sample);
    println!("Channels:    {}", header.channels);
    println!("Sample Rate: {} Hz", header.sample_rate);
    println!("Byte Rate:   {} B/s", header.byte_rate);
    println!("Block Align: {}", header.block_align);
    println!(
        "Data:        {} bytes at offset {}",
        header.data_size, header.data_offset
    );
    println!(
        "Duration:    {:.3}s ({} frames)",
        header.duration_secs(),
        header.frame_count()
    );
    if !header.is_pcm16_stereo() {
        println!("Note:        not 16-bit stereo PCM; playback will misinterpret it");
    }

    Ok(())
}
