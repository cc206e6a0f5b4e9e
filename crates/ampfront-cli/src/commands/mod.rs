//! CLI command implementations.

pub mod common;
pub mod info;
pub mod play;
pub mod stream;
pub mod tracks;

/// List output devices.
pub fn devices() -> anyhow::Result<()> {
    let devices = ampfront_io::list_output_devices()?;
    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }
    println!("Output Devices");
    println!("==============\n");
    for (idx, name) in devices.iter().enumerate() {
        println!("  [{idx}] {name}");
    }
    Ok(())
}
