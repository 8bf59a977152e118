//! Presentation sinks for transcript snapshots.

use crate::error::Result;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Pluggable transcript output handler.
///
/// Pairs with `AudioSource` on the input side: the recording worker pushes a
/// fresh snapshot here after every recognition event. A snapshot is the
/// ordered displayable lines; the last line may carry the provisional
/// marker.
pub trait TranscriptSink: Send + 'static {
    /// Handle an updated snapshot. Called once per recognition event.
    fn update(&mut self, lines: &[String]) -> Result<()>;

    /// Called once when recording stops.
    fn finish(&mut self) {}

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Sink that retains the latest snapshot for later inspection.
///
/// Useful for tests and for callers that poll instead of subscribing.
pub struct CollectorSink {
    latest: Arc<Mutex<Vec<String>>>,
    updates: Arc<Mutex<usize>>,
}

impl CollectorSink {
    /// Create a new collector sink.
    pub fn new() -> Self {
        Self {
            latest: Arc::new(Mutex::new(Vec::new())),
            updates: Arc::new(Mutex::new(0)),
        }
    }

    /// Shared handle to the latest snapshot, readable while recording.
    pub fn snapshot_handle(&self) -> Arc<Mutex<Vec<String>>> {
        self.latest.clone()
    }

    /// The latest snapshot.
    pub fn latest(&self) -> Vec<String> {
        self.latest
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Number of updates received so far.
    pub fn update_count(&self) -> usize {
        self.updates.lock().map(|count| *count).unwrap_or(0)
    }
}

impl Default for CollectorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptSink for CollectorSink {
    fn update(&mut self, lines: &[String]) -> Result<()> {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = lines.to_vec();
        }
        if let Ok(mut updates) = self.updates.lock() {
            *updates += 1;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Sink that prints committed lines to stdout as they arrive.
///
/// Provisional lines are rewritten in place with a carriage return, so the
/// terminal shows at most one in-progress line below the committed text.
pub struct StdoutSink {
    committed_printed: usize,
    provisional_shown: bool,
}

impl StdoutSink {
    /// Create a new stdout sink.
    pub fn new() -> Self {
        Self {
            committed_printed: 0,
            provisional_shown: false,
        }
    }

    fn clear_provisional(&mut self) {
        if self.provisional_shown {
            print!("\r{:80}\r", "");
            self.provisional_shown = false;
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptSink for StdoutSink {
    fn update(&mut self, lines: &[String]) -> Result<()> {
        let provisional = lines
            .last()
            .filter(|line| line.starts_with(crate::defaults::PROVISIONAL_MARKER));
        let committed_count = if provisional.is_some() {
            lines.len() - 1
        } else {
            lines.len()
        };

        self.clear_provisional();

        // Print newly committed lines, each on its own line.
        for line in &lines[self.committed_printed..committed_count] {
            println!("{}", line);
        }
        self.committed_printed = committed_count;

        if let Some(provisional) = provisional {
            print!("{}", provisional);
            self.provisional_shown = true;
        }
        let _ = std::io::stdout().flush();
        Ok(())
    }

    fn finish(&mut self) {
        self.clear_provisional();
        let _ = std::io::stdout().flush();
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
