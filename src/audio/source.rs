use crate::error::{Result, VoxlineError};
use std::collections::VecDeque;

/// A source of 16-bit PCM audio.
///
/// Implementations cover live capture devices, WAV files, and the scripted
/// mock used in tests. The capture worker polls `read_samples` and decides
/// end-of-input from `is_finite`.
pub trait AudioSource: Send {
    /// Begin producing audio.
    fn start(&mut self) -> Result<()>;

    /// Stop producing audio. Idempotent.
    fn stop(&mut self) -> Result<()>;

    /// Return whatever samples accumulated since the last read.
    ///
    /// An empty vector means "nothing right now" for a live source and
    /// "exhausted" for a finite one.
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// Whether this source runs out on its own (file, pipe) rather than
    /// producing audio until stopped (microphone).
    fn is_finite(&self) -> bool;
}

/// A run of identical frames served by [`MockAudioSource`].
#[derive(Debug, Clone)]
pub struct FramePhase {
    /// Samples returned for each read in this phase.
    pub samples: Vec<i16>,
    /// Number of reads this phase lasts.
    pub count: u32,
}

/// Scripted audio source for testing.
///
/// Serves its frame sequence one phase entry per `read_samples` call, then
/// returns empty reads. Finite by default; `as_live_source` makes it report
/// as a device-style endless source instead.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    phases: VecDeque<FramePhase>,
    remaining_in_phase: u32,
    finite: bool,
    should_fail_start: bool,
    should_fail_stop: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    pub fn new() -> Self {
        Self {
            is_started: false,
            phases: VecDeque::new(),
            remaining_in_phase: 0,
            finite: true,
            should_fail_start: false,
            should_fail_stop: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Serve `samples` for exactly one read.
    pub fn with_samples(self, samples: Vec<i16>) -> Self {
        self.with_frame_sequence(vec![FramePhase { samples, count: 1 }])
    }

    /// Serve the given phases in order, then report exhaustion.
    pub fn with_frame_sequence(mut self, phases: Vec<FramePhase>) -> Self {
        self.phases = phases.into();
        self.remaining_in_phase = self.phases.front().map(|p| p.count).unwrap_or(0);
        self
    }

    /// Report as an endless device source instead of a finite one.
    pub fn as_live_source(mut self) -> Self {
        self.finite = false;
        self
    }

    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    pub fn with_stop_failure(mut self) -> Self {
        self.should_fail_stop = true;
        self
    }

    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    pub fn is_started(&self) -> bool {
        self.is_started
    }

    fn capture_error(&self) -> VoxlineError {
        VoxlineError::AudioCapture {
            message: self.error_message.clone(),
        }
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(self.capture_error());
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.should_fail_stop {
            return Err(self.capture_error());
        }
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(self.capture_error());
        }

        while self.remaining_in_phase == 0 {
            self.phases.pop_front();
            match self.phases.front() {
                Some(phase) => self.remaining_in_phase = phase.count,
                None => return Ok(Vec::new()),
            }
        }

        self.remaining_in_phase -= 1;
        Ok(self
            .phases
            .front()
            .map(|phase| phase.samples.clone())
            .unwrap_or_default())
    }

    fn is_finite(&self) -> bool {
        self.finite
    }
}
