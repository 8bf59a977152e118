//! WAV file and pipe sources for running recognition over recorded audio.

use crate::audio::source::AudioSource;
use crate::defaults;
use crate::error::{Result, VoxlineError};
use std::io::Read;
use std::path::Path;

/// Finite audio source backed by decoded WAV data.
///
/// Decodes the whole file up front, downmixes to mono, resamples to the
/// recognizer rate, and serves fixed-size chunks until exhausted.
pub struct WavAudioSource {
    samples: Vec<i16>,
    position: usize,
}

impl WavAudioSource {
    /// Decodes a WAV file from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(Box::new(std::io::BufReader::new(file)))
    }

    /// Decodes WAV data from any reader.
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self> {
        let mut wav = hound::WavReader::new(reader).map_err(|e| VoxlineError::AudioCapture {
            message: format!("failed to parse WAV data: {e}"),
        })?;

        let spec = wav.spec();
        let raw = decode_samples(&mut wav, spec)?;
        let mono = downmix(&raw, spec.channels as usize);
        let samples = resample(&mono, spec.sample_rate, defaults::SAMPLE_RATE);

        Ok(Self {
            samples,
            position: 0,
        })
    }

    /// Decodes WAV data piped through stdin.
    ///
    /// Reads everything into memory first; `StdinLock` cannot move across
    /// threads with the source.
    pub fn from_stdin() -> Result<Self> {
        let mut buffer = Vec::new();
        std::io::stdin().lock().read_to_end(&mut buffer)?;
        Self::from_reader(Box::new(std::io::Cursor::new(buffer)))
    }

    /// Total number of decoded samples at the recognizer rate.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AudioSource for WavAudioSource {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.position >= self.samples.len() {
            return Ok(Vec::new());
        }

        let end = (self.position + defaults::CHUNK_SAMPLES).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;
        Ok(chunk)
    }

    fn is_finite(&self) -> bool {
        true
    }
}

/// Reads all samples from the WAV stream as i16, whatever the on-disk format.
fn decode_samples<R: Read>(
    wav: &mut hound::WavReader<R>,
    spec: hound::WavSpec,
) -> Result<Vec<i16>> {
    let read_error = |e: hound::Error| VoxlineError::AudioCapture {
        message: format!("failed to read WAV samples: {e}"),
    };

    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, bits) if bits <= 16 => wav
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_error),
        (hound::SampleFormat::Int, bits) => {
            let shift = bits - 16;
            wav.samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as i16))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(read_error)
        }
        (hound::SampleFormat::Float, _) => wav
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_error),
    }
}

/// Averages interleaved frames down to one channel.
fn downmix(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Linear-interpolation resampling between arbitrary rates.
pub(crate) fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = source_pos - source_idx as f64;

            match samples.get(source_idx + 1) {
                Some(&next) => {
                    let left = samples[source_idx] as f64;
                    (left + (next as f64 - left) * fraction) as i16
                }
                None => samples[source_idx],
            }
        })
        .collect()
}
