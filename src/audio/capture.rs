//! Live microphone capture through CPAL.

use crate::audio::source::AudioSource;
use crate::defaults;
use crate::error::{Result, VoxlineError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Quiet down JACK/PipeWire/ALSA chatter that backend probing triggers.
///
/// # Safety
/// Mutates environment variables; call at startup before spawning threads.
pub fn suppress_backend_chatter() {
    // SAFETY: called from main before any thread exists
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// Server-backed devices that follow the desktop's input selection.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse"];

/// Device names that are never useful for voice input.
const FILTERED_PATTERNS: &[&str] = &["surround", "front:", "rear:", "hdmi", "s/pdif"];

fn is_preferred(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES.iter().any(|p| lower.contains(p))
}

fn is_filtered(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Lists usable input devices, preferred ones first.
///
/// # Errors
/// `VoxlineError::AudioCapture` when enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host.input_devices().map_err(|e| VoxlineError::AudioCapture {
        message: format!("failed to enumerate input devices: {e}"),
    })?;

    let mut preferred = Vec::new();
    let mut rest = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if is_filtered(&name) {
                continue;
            }
            if is_preferred(&name) {
                preferred.push(name);
            } else {
                rest.push(name);
            }
        }
    }
    preferred.extend(rest);
    Ok(preferred)
}

fn find_device(device_name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    if let Some(name) = device_name {
        let devices = host.input_devices().map_err(|e| VoxlineError::AudioCapture {
            message: format!("failed to enumerate input devices: {e}"),
        })?;
        for device in devices {
            if device.name().as_deref() == Ok(name) {
                return Ok(device);
            }
        }
        return Err(VoxlineError::NoAudioDevice {
            device: name.to_string(),
        });
    }

    // Prefer a sound-server device so the desktop's input selection applies.
    if let Ok(devices) = host.input_devices() {
        for device in devices {
            if let Ok(name) = device.name()
                && is_preferred(&name)
            {
                return Ok(device);
            }
        }
    }

    host.default_input_device()
        .ok_or_else(|| VoxlineError::NoAudioDevice {
            device: "default".to_string(),
        })
}

/// `cpal::Stream` is `!Send`; the capture worker owns the source exclusively,
/// so the stream never sees concurrent access.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Endless microphone source producing 16-bit mono PCM at the recognizer
/// rate.
///
/// Tries an i16 mono stream at the target rate first, then f32 with sample
/// conversion, then the device's native config with software downmix and
/// resampling.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Option<SendableStream>,
    buffer: Arc<Mutex<Vec<i16>>>,
    sample_rate: u32,
}

impl CpalAudioSource {
    /// Opens `device_name`, or picks the best default input device.
    ///
    /// # Errors
    /// `NoAudioDevice` when the named device does not exist or no input
    /// device is available.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        Ok(Self {
            device: find_device(device_name)?,
            stream: None,
            buffer: Arc::new(Mutex::new(Vec::new())),
            sample_rate: defaults::SAMPLE_RATE,
        })
    }

    fn build_stream(&self) -> Result<cpal::Stream> {
        let target_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let err_callback = |err| {
            eprintln!("voxline: audio stream error: {err}");
        };

        // i16 mono at the target rate; sound servers convert transparently.
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &target_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        // Some devices only expose float formats.
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &target_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend(data.iter().map(|&s| float_to_i16(s)));
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        self.build_native_stream()
    }

    /// Native device config with software downmix and resampling; handles
    /// backends that reject non-native configs outright.
    fn build_native_stream(&self) -> Result<cpal::Stream> {
        let native = self
            .device
            .default_input_config()
            .map_err(|e| VoxlineError::AudioCapture {
                message: format!("failed to query default input config: {e}"),
            })?;

        let native_rate = native.sample_rate().0;
        let native_channels = native.channels() as usize;
        let target_rate = self.sample_rate;
        let stream_config: cpal::StreamConfig = native.clone().into();
        let err_callback = |err| {
            eprintln!("voxline: audio stream error: {err}");
        };

        let buffer = Arc::clone(&self.buffer);
        match native.sample_format() {
            cpal::SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let converted =
                            to_target_format(data, native_channels, native_rate, target_rate);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| VoxlineError::AudioCapture {
                    message: format!("failed to build i16 input stream: {e}"),
                }),
            cpal::SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let as_i16: Vec<i16> = data.iter().map(|&s| float_to_i16(s)).collect();
                        let converted =
                            to_target_format(&as_i16, native_channels, native_rate, target_rate);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| VoxlineError::AudioCapture {
                    message: format!("failed to build f32 input stream: {e}"),
                }),
            fmt => Err(VoxlineError::AudioCapture {
                message: format!("unsupported native sample format: {fmt:?}"),
            }),
        }
    }
}

fn float_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn to_target_format(
    samples: &[i16],
    channels: usize,
    source_rate: u32,
    target_rate: u32,
) -> Vec<i16> {
    let mono: Vec<i16> = if channels <= 1 {
        samples.to_vec()
    } else {
        samples
            .chunks_exact(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    };
    crate::audio::wav::resample(&mono, source_rate, target_rate)
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| VoxlineError::AudioCapture {
            message: format!("failed to start audio stream: {e}"),
        })?;
        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            stream.0.pause().map_err(|e| VoxlineError::AudioCapture {
                message: format!("failed to stop audio stream: {e}"),
            })?;
        }
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| VoxlineError::AudioCapture {
                message: "audio buffer lock poisoned".to_string(),
            })?;
        Ok(std::mem::take(&mut *buffer))
    }

    fn is_finite(&self) -> bool {
        false
    }
}
