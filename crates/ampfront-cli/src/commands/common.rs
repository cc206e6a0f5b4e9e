//! Helpers shared by the playback and streaming commands.

use ampfront_config::{ConfigError, Settings, default_settings_path};
use ampfront_core::FilterType;
use ampfront_io::{
    AudioFrontend, CpalTransport, NullTransport, OutputTransport, PipelineConfig, PlayerConfig,
    WavFileTransport, WriteTimeouts,
};
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Where processed frames go.
#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct OutputArgs {
    /// Render to a WAV file instead of a device
    #[arg(short, long, value_name = "WAV")]
    pub out: Option<PathBuf>,

    /// Output device (partial name match)
    #[arg(short, long, value_name = "NAME")]
    pub device: Option<String>,

    /// Discard output (dry run)
    #[arg(long)]
    pub null: bool,
}

impl OutputArgs {
    /// Opens the selected transport.
    pub fn open(&self, sample_rate: u32) -> anyhow::Result<Box<dyn OutputTransport>> {
        if let Some(path) = &self.out {
            let transport = WavFileTransport::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            return Ok(Box::new(transport));
        }
        if self.null {
            return Ok(Box::new(NullTransport::new()));
        }
        let transport = CpalTransport::open(self.device.as_deref(), sample_rate)?;
        println!("Output device: {}", transport.device_name());
        Ok(Box::new(transport))
    }
}

/// Loads settings from `path`, or from the user settings file if present.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load(path)?,
        None => Settings::load_or_default(default_settings_path())?,
    };
    Ok(settings)
}

/// Validates settings after command-line overrides have been applied.
pub fn check_settings(settings: &Settings) -> anyhow::Result<()> {
    match settings.validate() {
        Ok(warnings) => {
            for warning in warnings {
                tracing::warn!("{warning}");
            }
            Ok(())
        }
        Err(e) => Err(ConfigError::from(e).into()),
    }
}

/// Builds a front-end from `settings` on `transport`.
pub fn build_frontend(
    settings: &Settings,
    transport: Box<dyn OutputTransport>,
) -> anyhow::Result<AudioFrontend> {
    let pipeline_config = PipelineConfig::new(settings.sample_rate).with_timeouts(WriteTimeouts {
        unfiltered: settings.unfiltered_timeout(),
        filtered: settings.filtered_timeout(),
    });
    let player_config = PlayerConfig {
        chunk_size: settings.playback.chunk_size,
        settle_delay: settings.settle_delay(),
    };

    let frontend = AudioFrontend::new(pipeline_config, transport, player_config)?;
    frontend.set_volume(settings.volume);
    frontend.set_active_source(settings.audio_source());
    if settings.filter.enabled {
        frontend.enable_filter(FilterType::Lowpass, settings.filter.lowpass_hz);
        frontend.enable_filter(FilterType::Highpass, settings.filter.highpass_hz);
    }
    Ok(frontend)
}

/// Installs a Ctrl+C handler and returns the flag it clears.
pub fn interrupt_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        eprintln!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;
    Ok(running)
}
