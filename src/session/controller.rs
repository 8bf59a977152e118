//! Top-level session orchestration: model selection, recording start/stop,
//! and chunk dispatch from the audio source into the recognizer.

use crate::audio::source::AudioSource;
use crate::defaults;
use crate::engine::decoder::SpeechEngine;
use crate::error::{Result, VoxlineError};
use crate::events::AudioChunk;
use crate::report::{ErrorReporter, LogReporter, Worker, WorkerReport};
use crate::session::model::ModelHandle;
use crate::session::recognizer::{RecognizerSession, SessionState};
use crate::sink::TranscriptSink;
use crate::transcript::TranscriptStream;
use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, TrySendError, bounded};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the session controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Sample rate the recognizer is created for.
    pub sample_rate: u32,
    /// Capacity of the bounded chunk queue between capture and decode.
    pub queue_capacity: usize,
    /// Interval at which the capture thread polls the audio source.
    pub poll_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            queue_capacity: defaults::CHUNK_QUEUE_CAPACITY,
            poll_interval: defaults::POLL_INTERVAL,
        }
    }
}

/// Recording state of the controller, orthogonal to the session's own
/// lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Recording,
}

/// Threads of one recording run.
struct RecordingHandle {
    running: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl RecordingHandle {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Signals shutdown and joins the worker threads.
    ///
    /// Waits up to the join deadline, then detaches whatever is left; a
    /// detached thread dies with the process.
    fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);

        let deadline = Instant::now() + defaults::JOIN_DEADLINE;
        let poll_interval = Duration::from_millis(10);

        loop {
            let mut remaining = Vec::new();
            for handle in self.threads.drain(..) {
                if handle.is_finished() {
                    if let Err(panic_info) = handle.join() {
                        let msg = panic_info
                            .downcast_ref::<&str>()
                            .copied()
                            .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                            .unwrap_or("unknown panic");
                        eprintln!("voxline: recording thread panicked: {msg}");
                    }
                } else {
                    remaining.push(handle);
                }
            }
            self.threads = remaining;

            if self.threads.is_empty() {
                break;
            }

            if Instant::now() >= deadline {
                eprintln!(
                    "voxline: stop timeout — {} thread(s) still running, detaching",
                    self.threads.len()
                );
                break;
            }

            thread::sleep(poll_interval);
        }
    }
}

/// Orchestrates the full recognition lifecycle for one session.
///
/// `select_model` loads a model and creates its recognizer, replacing any
/// previous pair. `start` wires an audio source to the recognizer through a
/// bounded FIFO queue and a single decode worker; `stop` tears the workers
/// down but keeps the model/recognizer loaded for a quick restart;
/// `shutdown` releases everything.
pub struct SessionController {
    engine: Arc<dyn SpeechEngine>,
    config: ControllerConfig,
    session: Arc<Mutex<RecognizerSession>>,
    transcript: Arc<Mutex<TranscriptStream>>,
    reporter: Arc<dyn ErrorReporter>,
    recording: Option<RecordingHandle>,
}

impl SessionController {
    /// Creates a controller with the default error reporter.
    pub fn new(engine: Arc<dyn SpeechEngine>, config: ControllerConfig) -> Self {
        let sample_rate = config.sample_rate;
        Self {
            engine,
            config,
            session: Arc::new(Mutex::new(RecognizerSession::new(sample_rate))),
            transcript: Arc::new(Mutex::new(TranscriptStream::new())),
            reporter: Arc::new(LogReporter),
            recording: None,
        }
    }

    /// Sets a custom error reporter.
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Loads the model at `path` and creates a recognizer for it, replacing
    /// any existing model/recognizer pair.
    ///
    /// The new pair is fully constructed before the old one is released, so
    /// a failure leaves the previous pair untouched. When called while
    /// recording, recording is stopped first; it is not restarted.
    ///
    /// # Errors
    /// `ModelNotFound`, `ModelLoad`, or `RecognizerCreate`, propagated from
    /// the load path.
    pub fn select_model(&mut self, path: &Path) -> Result<()> {
        if self.state() == ControllerState::Recording {
            self.stop();
        }

        let model = ModelHandle::load(self.engine.as_ref(), path)?;
        let replacement = RecognizerSession::create(model, self.config.sample_rate)?;

        let mut session = self.lock_session()?;
        // Dropping the old session releases its recognizer, then its model.
        *session = replacement;
        Ok(())
    }

    /// Begins recording: chunks from `source` are fed into the recognizer
    /// in capture order, and every recognition event pushes a fresh
    /// transcript snapshot into `sink`.
    ///
    /// A no-op when already recording.
    ///
    /// # Errors
    /// `VoxlineError::NoModelSelected` when no recognizer is active; source
    /// start errors are propagated as-is.
    pub fn start(
        &mut self,
        mut source: Box<dyn AudioSource>,
        sink: Box<dyn TranscriptSink>,
    ) -> Result<()> {
        if let Some(ref handle) = self.recording {
            if handle.is_running() {
                return Ok(());
            }
            // Previous run finished on its own; reap its threads first.
            self.stop();
        }

        if self.lock_session()?.state() != SessionState::Active {
            return Err(VoxlineError::NoModelSelected);
        }

        source.start()?;

        let running = Arc::new(AtomicBool::new(true));
        let (chunk_tx, chunk_rx) = bounded(self.config.queue_capacity);

        let capture = spawn_capture_worker(
            source,
            chunk_tx,
            running.clone(),
            self.reporter.clone(),
            self.config.poll_interval,
        );
        let decode = spawn_decode_worker(
            chunk_rx,
            self.session.clone(),
            self.transcript.clone(),
            sink,
            running.clone(),
            self.reporter.clone(),
        );

        self.recording = Some(RecordingHandle {
            running,
            threads: vec![capture, decode],
        });
        Ok(())
    }

    /// Stops recording and joins the worker threads. Idempotent.
    ///
    /// The model and recognizer stay loaded for a quick restart; no event
    /// is dispatched after teardown begins.
    pub fn stop(&mut self) {
        if let Some(handle) = self.recording.take() {
            handle.stop();
        }
    }

    /// Stops recording, then destroys the recognizer and unloads the model,
    /// in that order. Idempotent.
    pub fn shutdown(&mut self) {
        self.stop();
        if let Ok(mut session) = self.session.lock() {
            session.destroy();
        }
    }

    /// Current recording state.
    pub fn state(&self) -> ControllerState {
        match self.recording {
            Some(ref handle) if handle.is_running() => ControllerState::Recording,
            _ => ControllerState::Idle,
        }
    }

    /// Lifecycle state of the underlying recognizer session.
    pub fn session_state(&self) -> SessionState {
        self.session
            .lock()
            .map(|session| session.state())
            .unwrap_or(SessionState::Destroyed)
    }

    /// Current transcript snapshot: committed lines plus the marked
    /// provisional line, if any.
    pub fn snapshot(&self) -> Vec<String> {
        self.transcript
            .lock()
            .map(|transcript| transcript.snapshot())
            .unwrap_or_default()
    }

    /// Drops all transcript text, committed and provisional.
    pub fn clear_transcript(&mut self) {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.clear();
        }
    }

    fn lock_session(&self) -> Result<std::sync::MutexGuard<'_, RecognizerSession>> {
        self.session
            .lock()
            .map_err(|_| VoxlineError::Other("session lock poisoned".to_string()))
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Polls the audio source and pushes chunks into the bounded queue in
/// capture order.
///
/// When the queue is full the capture thread waits for the decoder rather
/// than dropping audio, and raises a one-shot warning through the reporter.
fn spawn_capture_worker(
    mut source: Box<dyn AudioSource>,
    chunk_tx: Sender<AudioChunk>,
    running: Arc<AtomicBool>,
    reporter: Arc<dyn ErrorReporter>,
    poll_interval: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut consecutive_errors: u32 = 0;
        let mut sequence: u64 = 0;
        let mut warned_full = false;

        'capture: while running.load(Ordering::SeqCst) {
            let samples = match source.read_samples() {
                Ok(samples) => {
                    consecutive_errors = 0;
                    samples
                }
                Err(e) => {
                    consecutive_errors += 1;
                    if consecutive_errors >= defaults::MAX_CONSECUTIVE_READ_ERRORS {
                        reporter.report(&WorkerReport::fatal(
                            Worker::Capture,
                            VoxlineError::AudioCapture {
                                message: format!(
                                    "read failed {consecutive_errors} times in a row: {e}"
                                ),
                            },
                        ));
                        break;
                    }
                    thread::sleep(poll_interval);
                    continue;
                }
            };

            if samples.is_empty() {
                if source.is_finite() {
                    // File/pipe source exhausted.
                    break;
                }
                // Live source: empty reads are normal while the device warms up.
                thread::sleep(poll_interval);
                continue;
            }

            let chunk = AudioChunk::new(samples, sequence);
            sequence += 1;

            match chunk_tx.try_send(chunk) {
                Ok(()) => {}
                Err(TrySendError::Full(chunk)) => {
                    if !warned_full {
                        reporter.report(&WorkerReport::warning(
                            Worker::Capture,
                            VoxlineError::AudioCapture {
                                message: "chunk queue full; waiting on the decoder".to_string(),
                            },
                        ));
                        warned_full = true;
                    }
                    // Block until the decoder catches up; audio is never
                    // dropped silently. Bail out if teardown begins.
                    let mut pending = chunk;
                    loop {
                        if !running.load(Ordering::SeqCst) {
                            break 'capture;
                        }
                        match chunk_tx.send_timeout(pending, Duration::from_millis(100)) {
                            Ok(()) => break,
                            Err(SendTimeoutError::Timeout(chunk)) => pending = chunk,
                            Err(SendTimeoutError::Disconnected(_)) => break 'capture,
                        }
                    }
                }
                Err(TrySendError::Disconnected(_)) => break,
            }

            thread::sleep(poll_interval);
        }

        if let Err(e) = source.stop() {
            eprintln!("voxline: failed to stop audio capture: {e}");
        }
    })
}

/// Single consumer of the chunk queue: feeds the recognizer, reconciles
/// events into the transcript, and pushes snapshots to the sink.
///
/// Serializing all feeds through this one thread is what guarantees the
/// decoder sees chunks in capture order.
fn spawn_decode_worker(
    chunk_rx: Receiver<AudioChunk>,
    session: Arc<Mutex<RecognizerSession>>,
    transcript: Arc<Mutex<TranscriptStream>>,
    mut sink: Box<dyn TranscriptSink>,
    running: Arc<AtomicBool>,
    reporter: Arc<dyn ErrorReporter>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut expected_sequence: u64 = 0;
        loop {
            match chunk_rx.recv_timeout(Duration::from_millis(100)) {
                Ok(chunk) => {
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }

                    // The capture worker numbers chunks densely; a gap means
                    // audio went missing somewhere upstream.
                    if chunk.sequence != expected_sequence {
                        reporter.report(&WorkerReport::warning(
                            Worker::Decode,
                            VoxlineError::Other(format!(
                                "chunk sequence gap: expected {expected_sequence}, got {}",
                                chunk.sequence
                            )),
                        ));
                    }
                    expected_sequence = chunk.sequence + 1;

                    let fed = match session.lock() {
                        Ok(mut session) => session.feed(&chunk),
                        Err(_) => {
                            reporter.report(&WorkerReport::fatal(
                                Worker::Decode,
                                VoxlineError::Other("session lock poisoned".to_string()),
                            ));
                            break;
                        }
                    };

                    match fed {
                        Ok(event) => {
                            // Teardown may have begun during the feed call;
                            // dispatch nothing past that point.
                            if !running.load(Ordering::SeqCst) {
                                break;
                            }
                            let snapshot = match transcript.lock() {
                                Ok(mut transcript) => {
                                    transcript.apply(event);
                                    transcript.snapshot()
                                }
                                Err(_) => {
                                    reporter.report(&WorkerReport::fatal(
                                        Worker::Decode,
                                        VoxlineError::Other(
                                            "transcript lock poisoned".to_string(),
                                        ),
                                    ));
                                    break;
                                }
                            };
                            if let Err(e) = sink.update(&snapshot) {
                                reporter.report(&WorkerReport::warning(Worker::Sink, e));
                            }
                        }
                        Err(e @ VoxlineError::MalformedResult { .. }) => {
                            // Non-fatal: drop the event, continue with the
                            // next chunk.
                            reporter.report(&WorkerReport::warning(Worker::Decode, e));
                        }
                        Err(e) => {
                            reporter.report(&WorkerReport::fatal(Worker::Decode, e));
                            break;
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // Source exhausted or teardown: mark the run finished either way.
        running.store(false, Ordering::SeqCst);
        sink.finish();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::{FramePhase, MockAudioSource};
    use crate::engine::mock::{MockEngine, ScriptStep};
    use crate::report::CollectingReporter;
    use crate::sink::CollectorSink;

    /// Sink that stalls the decode worker on its first update until the
    /// test releases it.
    struct GateSink {
        entered_tx: Sender<()>,
        release_rx: Receiver<()>,
        gated: bool,
    }

    impl TranscriptSink for GateSink {
        fn update(&mut self, _lines: &[String]) -> Result<()> {
            if self.gated {
                self.gated = false;
                let _ = self.entered_tx.send(());
                let _ = self.release_rx.recv();
            }
            Ok(())
        }
    }

    fn test_config() -> ControllerConfig {
        ControllerConfig {
            poll_interval: Duration::from_millis(1),
            ..Default::default()
        }
    }

    fn controller_with(engine: MockEngine) -> SessionController {
        SessionController::new(Arc::new(engine), test_config())
    }

    fn speech_source(chunks: u32) -> Box<MockAudioSource> {
        Box::new(MockAudioSource::new().with_frame_sequence(vec![FramePhase {
            samples: vec![1000i16; 160],
            count: chunks,
        }]))
    }

    /// Waits for a finite source to drain and the run to finish.
    fn wait_until_idle(controller: &SessionController) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while controller.state() == ControllerState::Recording {
            assert!(Instant::now() < deadline, "recording did not finish in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_start_without_model_fails() {
        let mut controller = controller_with(MockEngine::new());

        let result = controller.start(speech_source(1), Box::new(CollectorSink::new()));
        assert!(matches!(result, Err(VoxlineError::NoModelSelected)));

        // Recording was never entered, transcript untouched.
        assert_eq!(controller.state(), ControllerState::Idle);
        assert!(controller.snapshot().is_empty());
    }

    #[test]
    fn test_select_model_bad_path() {
        let mut controller = controller_with(MockEngine::new());
        let result = controller.select_model(Path::new("/nonexistent/model"));
        assert!(matches!(result, Err(VoxlineError::ModelNotFound { .. })));
        assert_eq!(controller.session_state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_select_model_activates_session() {
        let mut controller = controller_with(MockEngine::new());
        let dir = tempfile::tempdir().unwrap();

        controller.select_model(dir.path()).unwrap();
        assert_eq!(controller.session_state(), SessionState::Active);
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn test_select_model_failure_keeps_previous_pair() {
        let engine = MockEngine::new();
        let probe = engine.probe();
        let mut controller = controller_with(engine);
        let dir = tempfile::tempdir().unwrap();

        controller.select_model(dir.path()).unwrap();
        let result = controller.select_model(Path::new("/nonexistent/model"));
        assert!(result.is_err());

        // The first pair is still live and untouched.
        assert_eq!(controller.session_state(), SessionState::Active);
        assert_eq!(probe.models_freed(), 0);
        assert_eq!(probe.recognizers_freed(), 0);
    }

    #[test]
    fn test_select_model_twice_releases_first_pair_exactly_once() {
        let engine = MockEngine::new();
        let probe = engine.probe();
        let mut controller = controller_with(engine);
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();

        controller.select_model(dir_a.path()).unwrap();
        controller.select_model(dir_b.path()).unwrap();

        assert_eq!(probe.models_freed(), 1);
        assert_eq!(probe.recognizers_freed(), 1);
        assert_eq!(probe.drop_order(), vec!["recognizer", "model"]);
        assert_eq!(controller.session_state(), SessionState::Active);
    }

    #[test]
    fn test_recording_produces_transcript() {
        let engine = MockEngine::new().with_script(vec![
            ScriptStep::partial("hel"),
            ScriptStep::partial("hello"),
            ScriptStep::final_result("hello world"),
        ]);
        let mut controller = controller_with(engine);
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();

        controller
            .start(speech_source(3), Box::new(CollectorSink::new()))
            .unwrap();
        wait_until_idle(&controller);
        controller.stop();

        assert_eq!(controller.snapshot(), vec!["hello world".to_string()]);
    }

    #[test]
    fn test_sink_sees_provisional_then_committed() {
        let engine = MockEngine::new().with_script(vec![
            ScriptStep::partial("hel"),
            ScriptStep::final_result("hello"),
        ]);
        let mut controller = controller_with(engine);
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();

        let sink = CollectorSink::new();
        let handle = sink.snapshot_handle();

        controller.start(speech_source(2), Box::new(sink)).unwrap();
        wait_until_idle(&controller);
        controller.stop();

        let latest = handle.lock().unwrap().clone();
        assert_eq!(latest, vec!["hello".to_string()]);
    }

    #[test]
    fn test_malformed_payload_is_dropped_not_fatal() {
        let engine = MockEngine::new().with_script(vec![
            ScriptStep::partial("one"),
            ScriptStep::raw(false, b"garbage payload"),
            ScriptStep::final_result("one two"),
        ]);
        let mut controller = controller_with(engine);
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();

        controller
            .start(speech_source(3), Box::new(CollectorSink::new()))
            .unwrap();
        wait_until_idle(&controller);
        controller.stop();

        // The garbage chunk produced zero events and decoding continued.
        assert_eq!(controller.snapshot(), vec!["one two".to_string()]);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut controller = controller_with(MockEngine::new());
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();

        controller
            .start(speech_source(1), Box::new(CollectorSink::new()))
            .unwrap();
        controller.stop();
        controller.stop();

        assert_eq!(controller.state(), ControllerState::Idle);
        // The session survives stop for a quick restart.
        assert_eq!(controller.session_state(), SessionState::Active);
    }

    #[test]
    fn test_stop_keeps_model_for_restart() {
        let engine = MockEngine::new().with_script(vec![
            ScriptStep::final_result("first"),
            ScriptStep::final_result("second"),
        ]);
        let mut controller = controller_with(engine);
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();

        controller
            .start(speech_source(1), Box::new(CollectorSink::new()))
            .unwrap();
        wait_until_idle(&controller);
        controller.stop();

        // Restart without re-selecting the model.
        controller
            .start(speech_source(1), Box::new(CollectorSink::new()))
            .unwrap();
        wait_until_idle(&controller);
        controller.stop();

        assert_eq!(
            controller.snapshot(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn test_shutdown_destroys_session_in_order() {
        let engine = MockEngine::new();
        let probe = engine.probe();
        let mut controller = controller_with(engine);
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();

        controller.shutdown();
        assert_eq!(controller.session_state(), SessionState::Destroyed);
        assert_eq!(probe.drop_order(), vec!["recognizer", "model"]);

        // Idempotent: a second shutdown changes nothing.
        controller.shutdown();
        assert_eq!(probe.models_freed(), 1);
        assert_eq!(probe.recognizers_freed(), 1);
    }

    #[test]
    fn test_start_after_shutdown_fails() {
        let mut controller = controller_with(MockEngine::new());
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();
        controller.shutdown();

        let result = controller.start(speech_source(1), Box::new(CollectorSink::new()));
        assert!(matches!(result, Err(VoxlineError::NoModelSelected)));
    }

    #[test]
    fn test_source_start_failure_propagates() {
        let mut controller = controller_with(MockEngine::new());
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();

        let source = Box::new(MockAudioSource::new().with_start_failure());
        let result = controller.start(source, Box::new(CollectorSink::new()));
        assert!(matches!(result, Err(VoxlineError::AudioCapture { .. })));
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn test_persistent_read_errors_end_the_run() {
        let reporter = Arc::new(CollectingReporter::new());
        let mut controller =
            controller_with(MockEngine::new()).with_error_reporter(reporter.clone());
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();

        let source = Box::new(MockAudioSource::new().with_read_failure());
        controller
            .start(source, Box::new(CollectorSink::new()))
            .unwrap();

        wait_until_idle(&controller);
        controller.stop();
        assert!(controller.snapshot().is_empty());

        // The capture worker gave up with a fatal report naming the cause.
        assert!(reporter.saw_fatal());
        let reports = reporter.reports();
        let fatal = reports.iter().find(|report| report.fatal).unwrap();
        assert_eq!(fatal.worker, Worker::Capture);
        assert!(fatal.message.contains("times in a row"));
    }

    #[test]
    fn test_select_model_while_recording_stops_first() {
        let engine = MockEngine::new();
        let probe = engine.probe();
        let mut controller = controller_with(engine);
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        controller.select_model(dir_a.path()).unwrap();

        // Live (infinite) source keeps the run going until stopped.
        let source = Box::new(
            MockAudioSource::new()
                .as_live_source()
                .with_frame_sequence(vec![FramePhase {
                    samples: vec![1000i16; 160],
                    count: 10_000,
                }]),
        );
        controller.start(source, Box::new(CollectorSink::new())).unwrap();
        assert_eq!(controller.state(), ControllerState::Recording);

        controller.select_model(dir_b.path()).unwrap();

        // Never a live swap: recording stopped, old pair released once.
        assert_eq!(controller.state(), ControllerState::Idle);
        assert_eq!(probe.models_freed(), 1);
        assert_eq!(probe.recognizers_freed(), 1);
        assert_eq!(controller.session_state(), SessionState::Active);
    }

    #[test]
    fn test_chunks_are_fed_in_capture_order() {
        // Script distinct finals; committed order must match capture order.
        let engine = MockEngine::new().with_script(vec![
            ScriptStep::final_result("one"),
            ScriptStep::final_result("two"),
            ScriptStep::final_result("three"),
        ]);
        let mut controller = SessionController::new(
            Arc::new(engine),
            ControllerConfig {
                poll_interval: Duration::from_millis(1),
                queue_capacity: 2,
                ..Default::default()
            },
        );
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();

        controller
            .start(speech_source(3), Box::new(CollectorSink::new()))
            .unwrap();
        wait_until_idle(&controller);
        controller.stop();

        assert_eq!(
            controller.snapshot(),
            vec!["one".to_string(), "two".to_string(), "three".to_string()]
        );
    }

    #[test]
    fn test_full_queue_blocks_capture_without_dropping_audio() {
        let engine = MockEngine::new().with_script(vec![
            ScriptStep::final_result("one"),
            ScriptStep::final_result("two"),
            ScriptStep::final_result("three"),
            ScriptStep::final_result("four"),
        ]);
        let reporter = Arc::new(CollectingReporter::new());
        let mut controller = SessionController::new(
            Arc::new(engine),
            ControllerConfig {
                poll_interval: Duration::from_millis(1),
                queue_capacity: 1,
                ..Default::default()
            },
        )
        .with_error_reporter(reporter.clone());
        let dir = tempfile::tempdir().unwrap();
        controller.select_model(dir.path()).unwrap();

        let (entered_tx, entered_rx) = bounded(1);
        let (release_tx, release_rx) = bounded::<()>(1);
        let sink = GateSink {
            entered_tx,
            release_rx,
            gated: true,
        };

        controller.start(speech_source(4), Box::new(sink)).unwrap();

        // The decoder is stalled inside its first sink update, so the
        // one-slot queue must fill and capture must fall back to waiting.
        entered_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("decoder never reached the sink");
        let deadline = Instant::now() + Duration::from_secs(5);
        while reporter.warning_count(Worker::Capture) == 0 {
            assert!(
                Instant::now() < deadline,
                "capture never reported the full queue"
            );
            thread::sleep(Duration::from_millis(5));
        }

        release_tx.send(()).unwrap();
        wait_until_idle(&controller);
        controller.stop();

        // Every chunk made it through, in capture order, and the full-queue
        // warning fired exactly once.
        assert_eq!(
            controller.snapshot(),
            vec![
                "one".to_string(),
                "two".to_string(),
                "three".to_string(),
                "four".to_string()
            ]
        );
        assert_eq!(reporter.warning_count(Worker::Capture), 1);
        assert!(!reporter.saw_fatal());
        assert!(reporter.reports()[0].message.contains("queue full"));
    }

    #[test]
    fn test_decode_reports_sequence_gap() {
        let engine = MockEngine::new()
            .with_script(vec![ScriptStep::partial("a"), ScriptStep::partial("ab")]);
        let dir = tempfile::tempdir().unwrap();
        let model = ModelHandle::load(&engine, dir.path()).unwrap();
        let session = Arc::new(Mutex::new(
            RecognizerSession::create(model, defaults::SAMPLE_RATE).unwrap(),
        ));
        let transcript = Arc::new(Mutex::new(TranscriptStream::new()));
        let running = Arc::new(AtomicBool::new(true));
        let reporter = Arc::new(CollectingReporter::new());

        let (chunk_tx, chunk_rx) = bounded(4);
        let worker = spawn_decode_worker(
            chunk_rx,
            session,
            transcript,
            Box::new(CollectorSink::new()),
            running,
            reporter.clone(),
        );

        chunk_tx.send(AudioChunk::new(vec![1000; 160], 0)).unwrap();
        chunk_tx.send(AudioChunk::new(vec![1000; 160], 2)).unwrap();
        drop(chunk_tx);
        worker.join().unwrap();

        assert_eq!(reporter.warning_count(Worker::Decode), 1);
        assert!(reporter.reports()[0].message.contains("sequence gap"));
        assert!(!reporter.saw_fatal());
    }

    #[test]
    fn test_config_default() {
        let config = ControllerConfig::default();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.queue_capacity, defaults::CHUNK_QUEUE_CAPACITY);
        assert_eq!(config.poll_interval, defaults::POLL_INTERVAL);
    }
}
