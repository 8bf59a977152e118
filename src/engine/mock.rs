//! Scripted mock engine for testing.

use crate::engine::decoder::{EngineModel, EngineRecognizer, SpeechEngine};
use serde_json::json;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted decoder response, consumed per `accept_waveform` call.
#[derive(Debug, Clone)]
pub struct ScriptStep {
    /// Whether this step reports an utterance boundary.
    pub is_final: bool,
    /// Raw payload returned by `result`/`partial_result` for this step.
    pub payload: Vec<u8>,
}

impl ScriptStep {
    /// A partial result carrying `text`.
    pub fn partial(text: &str) -> Self {
        Self {
            is_final: false,
            payload: json!({ "partial": text }).to_string().into_bytes(),
        }
    }

    /// A final result carrying `text`.
    pub fn final_result(text: &str) -> Self {
        Self {
            is_final: true,
            payload: json!({ "text": text }).to_string().into_bytes(),
        }
    }

    /// A step with an arbitrary raw payload, for malformed-input tests.
    pub fn raw(is_final: bool, payload: &[u8]) -> Self {
        Self {
            is_final,
            payload: payload.to_vec(),
        }
    }
}

#[derive(Debug, Default)]
struct ProbeInner {
    models_freed: AtomicUsize,
    recognizers_freed: AtomicUsize,
    drop_order: Mutex<Vec<&'static str>>,
}

/// Observation handle into a [`MockEngine`]'s resource lifecycle.
///
/// Lets tests assert that handles were released, how many times, and in
/// which order (recognizer before model).
#[derive(Debug, Clone, Default)]
pub struct EngineProbe {
    inner: Arc<ProbeInner>,
}

impl EngineProbe {
    /// Number of models released so far.
    pub fn models_freed(&self) -> usize {
        self.inner.models_freed.load(Ordering::SeqCst)
    }

    /// Number of recognizers released so far.
    pub fn recognizers_freed(&self) -> usize {
        self.inner.recognizers_freed.load(Ordering::SeqCst)
    }

    /// Release order as a sequence of `"recognizer"` / `"model"` entries.
    pub fn drop_order(&self) -> Vec<&'static str> {
        self.inner
            .drop_order
            .lock()
            .map(|order| order.clone())
            .unwrap_or_default()
    }

    fn record_model_freed(&self) {
        self.inner.models_freed.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut order) = self.inner.drop_order.lock() {
            order.push("model");
        }
    }

    fn record_recognizer_freed(&self) {
        self.inner.recognizers_freed.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut order) = self.inner.drop_order.lock() {
            order.push("recognizer");
        }
    }
}

type SharedScript = Arc<Mutex<VecDeque<ScriptStep>>>;

/// Mock decoding engine with a scripted response sequence.
///
/// Every recognizer created from this engine consumes steps from the same
/// shared script, one step per `accept_waveform` call. When the script is
/// exhausted the recognizer reports an ongoing utterance with empty text.
#[derive(Debug, Clone)]
pub struct MockEngine {
    script: SharedScript,
    probe: EngineProbe,
    should_fail_model: bool,
    should_fail_recognizer: bool,
}

impl MockEngine {
    /// Create a new mock engine with an empty script.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            probe: EngineProbe::default(),
            should_fail_model: false,
            should_fail_recognizer: false,
        }
    }

    /// Configure the scripted response sequence.
    pub fn with_script(self, steps: Vec<ScriptStep>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            *script = steps.into();
        }
        self
    }

    /// Configure the mock to reject model loads.
    pub fn with_model_failure(mut self) -> Self {
        self.should_fail_model = true;
        self
    }

    /// Configure the mock to reject recognizer creation.
    pub fn with_recognizer_failure(mut self) -> Self {
        self.should_fail_recognizer = true;
        self
    }

    /// Observation handle for resource-lifecycle assertions.
    pub fn probe(&self) -> EngineProbe {
        self.probe.clone()
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechEngine for MockEngine {
    fn new_model(&self, _path: &Path) -> Option<Box<dyn EngineModel>> {
        if self.should_fail_model {
            return None;
        }
        Some(Box::new(MockModel {
            script: self.script.clone(),
            probe: self.probe.clone(),
            should_fail_recognizer: self.should_fail_recognizer,
        }))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

struct MockModel {
    script: SharedScript,
    probe: EngineProbe,
    should_fail_recognizer: bool,
}

impl EngineModel for MockModel {
    fn new_recognizer(&self, _sample_rate: u32) -> Option<Box<dyn EngineRecognizer>> {
        if self.should_fail_recognizer {
            return None;
        }
        Some(Box::new(MockRecognizer {
            script: self.script.clone(),
            probe: self.probe.clone(),
            current: None,
        }))
    }
}

impl Drop for MockModel {
    fn drop(&mut self) {
        self.probe.record_model_freed();
    }
}

struct MockRecognizer {
    script: SharedScript,
    probe: EngineProbe,
    current: Option<ScriptStep>,
}

impl EngineRecognizer for MockRecognizer {
    fn accept_waveform(&mut self, _samples: &[i16]) -> bool {
        self.current = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());
        self.current.as_ref().map(|step| step.is_final).unwrap_or(false)
    }

    fn result(&mut self) -> Vec<u8> {
        match self.current {
            Some(ref step) if step.is_final => step.payload.clone(),
            _ => br#"{"text": ""}"#.to_vec(),
        }
    }

    fn partial_result(&mut self) -> Vec<u8> {
        match self.current {
            Some(ref step) if !step.is_final => step.payload.clone(),
            _ => br#"{"partial": ""}"#.to_vec(),
        }
    }
}

impl Drop for MockRecognizer {
    fn drop(&mut self) {
        self.probe.record_recognizer_freed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_scripted_steps_are_consumed_in_order() {
        let engine = MockEngine::new().with_script(vec![
            ScriptStep::partial("hel"),
            ScriptStep::final_result("hello"),
        ]);
        let model = engine.new_model(&PathBuf::from("any")).unwrap();
        let mut recognizer = model.new_recognizer(16000).unwrap();

        assert!(!recognizer.accept_waveform(&[0; 160]));
        assert_eq!(recognizer.partial_result(), br#"{"partial":"hel"}"#.to_vec());

        assert!(recognizer.accept_waveform(&[0; 160]));
        assert_eq!(recognizer.result(), br#"{"text":"hello"}"#.to_vec());
    }

    #[test]
    fn test_exhausted_script_reports_empty_partial() {
        let engine = MockEngine::new();
        let model = engine.new_model(&PathBuf::from("any")).unwrap();
        let mut recognizer = model.new_recognizer(16000).unwrap();

        assert!(!recognizer.accept_waveform(&[0; 160]));
        assert_eq!(recognizer.partial_result(), br#"{"partial": ""}"#.to_vec());
    }

    #[test]
    fn test_model_failure() {
        let engine = MockEngine::new().with_model_failure();
        assert!(engine.new_model(&PathBuf::from("any")).is_none());
    }

    #[test]
    fn test_recognizer_failure() {
        let engine = MockEngine::new().with_recognizer_failure();
        let model = engine.new_model(&PathBuf::from("any")).unwrap();
        assert!(model.new_recognizer(16000).is_none());
    }

    #[test]
    fn test_probe_counts_frees_and_order() {
        let engine = MockEngine::new();
        let probe = engine.probe();

        let model = engine.new_model(&PathBuf::from("any")).unwrap();
        let recognizer = model.new_recognizer(16000).unwrap();

        assert_eq!(probe.models_freed(), 0);
        assert_eq!(probe.recognizers_freed(), 0);

        drop(recognizer);
        drop(model);

        assert_eq!(probe.models_freed(), 1);
        assert_eq!(probe.recognizers_freed(), 1);
        assert_eq!(probe.drop_order(), vec!["recognizer", "model"]);
    }
}
