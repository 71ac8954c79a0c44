//! System microphone recording via CPAL.
//!
//! Handles device enumeration, format conversion, and channel downmixing.
//! Capture runs for a fixed window; each CPAL callback contributes one raw
//! chunk, and the chunks stay separate until the segment encoder merges them.

use super::dispatch::append_downmixed_samples;
use crate::log_debug;
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How often the capture loop re-checks the early-stop flag.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// One fixed-window capture: the raw callback chunks plus the rate they were
/// recorded at.
#[derive(Debug)]
pub struct RawCapture {
    pub chunks: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

/// Audio input device wrapper.
///
/// Abstracts CPAL device handling and provides fixed-duration capture with
/// automatic format conversion.
pub struct Recorder {
    device: cpal::Device,
}

impl Recorder {
    /// List microphone names so the CLI can expose a human-friendly selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host.input_devices().context("no input devices available")?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    /// Create a recorder, optionally forcing a specific device so users can
    /// pick the right microphone when a laptop exposes multiple inputs.
    pub fn new(preferred_device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match preferred_device {
            Some(name) => {
                let mut devices = host.input_devices().context("no input devices available")?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| anyhow!("input device '{name}' not found"))?
            }
            None => host
                .default_input_device()
                .context("no default input device available")?,
        };
        Ok(Self { device })
    }

    /// Get the name of the active recording device.
    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown Device".to_string())
    }

    /// Record for `duration` (or until `stop_flag` is raised), keeping each
    /// callback delivery as its own chunk. Mono downmixing happens inline;
    /// rate conversion is left to the segment encoder.
    pub fn record_chunks(
        &self,
        duration: Duration,
        stop_flag: Option<&AtomicBool>,
    ) -> Result<RawCapture> {
        // Get the device's default config so we know the native format and channel count.
        let default_config = self.device.default_input_config()?;
        let format = default_config.sample_format();
        let device_config: StreamConfig = default_config.clone().into();
        let device_sample_rate = device_config.sample_rate.0;
        let channels = usize::from(device_config.channels.max(1));
        let device_name = self
            .device
            .name()
            .unwrap_or_else(|_| "unknown input device".to_string());

        log_debug(&format!(
            "Recorder config: format={format:?} sample_rate={device_sample_rate}Hz channels={channels}"
        ));

        // cpal delivers samples on a callback thread; collect them in a shared
        // buffer so we can keep ownership on the caller side.
        let buffer = Arc::new(Mutex::new(Vec::<Vec<f32>>::new()));
        let buffer_clone = buffer.clone();

        // Keep the error callback quiet in the UI and mirror issues into the log.
        let err_fn = |err| log_debug(&format!("audio_stream_error: {err}"));

        // Convert every supported sample type to f32 up front so the rest of
        // the pipeline can stay format-agnostic.
        let stream = match format {
            SampleFormat::F32 => self.device.build_input_stream(
                &device_config,
                move |data: &[f32], _| {
                    push_chunk(&buffer_clone, data, channels, |sample| sample);
                },
                err_fn,
                None,
            )?,
            SampleFormat::I16 => self.device.build_input_stream(
                &device_config,
                move |data: &[i16], _| {
                    push_chunk(&buffer_clone, data, channels, |sample| {
                        sample as f32 / 32_768.0_f32
                    });
                },
                err_fn,
                None,
            )?,
            SampleFormat::U16 => self.device.build_input_stream(
                &device_config,
                move |data: &[u16], _| {
                    push_chunk(&buffer_clone, data, channels, |sample| {
                        (sample as f32 - 32_768.0_f32) / 32_768.0_f32
                    });
                },
                err_fn,
                None,
            )?,
            other => return Err(anyhow!("unsupported sample format: {other:?}")),
        };

        stream.play()?;
        let deadline = Instant::now() + duration;
        let mut stopped_early = false;
        loop {
            if let Some(flag) = stop_flag {
                if flag.load(Ordering::Relaxed) {
                    stopped_early = true;
                    break;
                }
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(STOP_POLL_INTERVAL.min(deadline - now));
        }
        if let Err(err) = stream.pause() {
            log_debug(&format!("failed to pause audio stream: {err}"));
        }
        drop(stream);

        let chunks = {
            let mut guard = buffer
                .lock()
                .map_err(|_| anyhow!("audio buffer lock poisoned"))?;
            std::mem::take(&mut *guard)
        };

        // A window cut short before the device delivered anything is not a
        // device failure; the caller decides whether the chain continues.
        if chunks.is_empty() && !stopped_early {
            return Err(anyhow!(
                "no samples captured from '{device_name}'; check microphone permissions and availability. {}",
                mic_permission_hint()
            ));
        }

        Ok(RawCapture {
            chunks,
            sample_rate: device_sample_rate,
        })
    }
}

fn push_chunk<T, F>(buffer: &Arc<Mutex<Vec<Vec<f32>>>>, data: &[T], channels: usize, convert: F)
where
    T: Copy,
    F: FnMut(T) -> f32,
{
    let mut chunk = Vec::with_capacity(data.len() / channels.max(1));
    append_downmixed_samples(&mut chunk, data, channels, convert);
    if chunk.is_empty() {
        return;
    }
    if let Ok(mut buf) = buffer.lock() {
        buf.push(chunk);
    }
}

fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone (enable your terminal)."
    }
    #[cfg(target_os = "linux")]
    {
        "Linux: check PipeWire/PulseAudio permissions and ensure the device is not muted."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & Security > Microphone (allow access for your terminal)."
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "Check OS microphone permissions."
    }
}
