//! Transport that plays frames on a system audio device through cpal.
//!
//! Frames travel over a bounded [`ChannelTransport`] to the device callback,
//! which converts them to f32 and fills any shortfall with silence. A full
//! queue makes `write_frame` wait up to its timeout, pacing the feeder at the
//! device's consumption rate.

use crate::transport::{ChannelTransport, FrameReceiver, OutputTransport, TransportError};
use crate::{Error, Result};
use ampfront_core::AudioFrame;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::time::Duration;

/// Frames queued between the pipeline and the device callback.
const QUEUE_FRAMES: usize = 4096;

/// Device callback buffer size in frames.
const DEVICE_BUFFER_FRAMES: u32 = 512;

fn device_name(device: &cpal::Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Names of the available output devices.
pub fn list_output_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;
    Ok(devices.filter_map(|d| device_name(&d).ok()).collect())
}

/// Finds an output device whose name contains `name`, or the default device.
fn find_output_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();
    match name {
        Some(search) => {
            let search_lower = search.to_lowercase();
            let devices = host
                .output_devices()
                .map_err(|e| Error::Stream(e.to_string()))?;

            for device in devices {
                if let Ok(dev_name) = device_name(&device)
                    && dev_name.to_lowercase().contains(search_lower.as_str())
                {
                    return Ok(device);
                }
            }
            Err(Error::DeviceNotFound(format!(
                "no output device matching '{search}'"
            )))
        }
        None => host.default_output_device().ok_or(Error::NoDevice),
    }
}

/// Plays frames on a cpal output device.
pub struct CpalTransport {
    device: cpal::Device,
    name: String,
    queue: ChannelTransport,
    receiver: FrameReceiver,
    sample_rate: u32,
    stream: cpal::Stream,
}

impl CpalTransport {
    /// Opens `device` (or the default output device) at `sample_rate`.
    pub fn open(device: Option<&str>, sample_rate: u32) -> Result<Self> {
        let device = find_output_device(device)?;
        let name = device_name(&device).unwrap_or_else(|_| "unknown".to_string());
        let (queue, receiver) = ChannelTransport::new(QUEUE_FRAMES, sample_rate);
        let stream = build_stream(&device, receiver.clone(), sample_rate)?;
        tracing::info!(device = %name, sample_rate, "output stream started");
        Ok(Self {
            device,
            name,
            queue,
            receiver,
            sample_rate,
            stream,
        })
    }

    /// Name of the opened device.
    pub fn device_name(&self) -> &str {
        &self.name
    }
}

fn build_stream(
    device: &cpal::Device,
    receiver: FrameReceiver,
    sample_rate: u32,
) -> Result<cpal::Stream> {
    let config = cpal::StreamConfig {
        channels: 2,
        sample_rate,
        buffer_size: cpal::BufferSize::Fixed(DEVICE_BUFFER_FRAMES),
    };

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for out in data.chunks_exact_mut(2) {
                    let frame = receiver.try_recv().unwrap_or_default();
                    out[0] = f32::from(frame.slots[0]) / 32768.0;
                    out[1] = f32::from(frame.slots[1]) / 32768.0;
                }
            },
            move |err| {
                tracing::error!(error = %err, "output stream error");
            },
            None,
        )
        .map_err(|e| Error::Stream(e.to_string()))?;

    stream.play().map_err(|e| Error::Stream(e.to_string()))?;
    Ok(stream)
}

impl OutputTransport for CpalTransport {
    fn name(&self) -> &str {
        "cpal"
    }

    fn write_frame(
        &mut self,
        frame: AudioFrame,
        timeout: Duration,
    ) -> std::result::Result<usize, TransportError> {
        self.queue.write_frame(frame, timeout)
    }

    fn set_sample_rate(&mut self, sample_rate: u32) -> std::result::Result<(), TransportError> {
        if sample_rate == self.sample_rate {
            return Ok(());
        }
        // Frames queued at the old rate would play at the wrong speed.
        while self.receiver.try_recv().is_some() {}
        self.stream = build_stream(&self.device, self.receiver.clone(), sample_rate)
            .map_err(|e| TransportError::Device(e.to_string()))?;
        self.queue.set_sample_rate(sample_rate)?;
        self.sample_rate = sample_rate;
        tracing::info!(device = %self.name, sample_rate, "output stream rebuilt");
        Ok(())
    }

    fn flush(&mut self) -> std::result::Result<(), TransportError> {
        // Let the device drain what is queued, bounded by the queue length.
        let frames = self.receiver.len() as u64;
        let deadline =
            Duration::from_micros(frames * 1_000_000 / u64::from(self.sample_rate.max(1)));
        let step = Duration::from_millis(5);
        let mut waited = Duration::ZERO;
        while !self.receiver.is_empty() && waited <= deadline + step {
            std::thread::sleep(step);
            waited += step;
        }
        Ok(())
    }
}
