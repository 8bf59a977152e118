//! Reconciliation of partial and final events into a stable transcript.

use crate::defaults::PROVISIONAL_MARKER;
use crate::events::RecognitionEvent;

/// An append-only transcript view built from a stream of recognition events.
///
/// The transcript holds an ordered sequence of committed lines plus at most
/// one trailing provisional segment. Committed lines never change once
/// appended. Each `Partial` replaces the provisional segment wholesale; a
/// `Final` commits its own text (authoritative over whatever partial text
/// preceded it) and clears the provisional slot.
#[derive(Debug, Clone, Default)]
pub struct TranscriptStream {
    committed: Vec<String>,
    provisional: Option<String>,
}

impl TranscriptStream {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one recognition event.
    ///
    /// Empty text is "nothing to display": an empty `Partial` clears the
    /// provisional segment, an empty `Final` clears it without committing a
    /// line.
    pub fn apply(&mut self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Partial(text) => {
                if text.is_empty() {
                    self.provisional = None;
                } else {
                    self.provisional = Some(text);
                }
            }
            RecognitionEvent::Final(text) => {
                self.provisional = None;
                if !text.is_empty() {
                    self.committed.push(text);
                }
            }
        }
    }

    /// Ordered displayable lines: committed lines, then the provisional
    /// segment (if any) prefixed with the provisional marker.
    pub fn snapshot(&self) -> Vec<String> {
        let mut lines = self.committed.clone();
        if let Some(ref provisional) = self.provisional {
            lines.push(format!("{}{}", PROVISIONAL_MARKER, provisional));
        }
        lines
    }

    /// Committed lines only.
    pub fn committed(&self) -> &[String] {
        &self.committed
    }

    /// Current provisional text, if any.
    pub fn provisional(&self) -> Option<&str> {
        self.provisional.as_deref()
    }

    /// Returns true when nothing has been committed and nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.provisional.is_none()
    }

    /// Drops all committed and provisional text.
    pub fn clear(&mut self) {
        self.committed.clear();
        self.provisional = None;
    }
}
