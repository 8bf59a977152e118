//! Data types flowing through the recognition session.

/// A chunk of captured PCM audio on its way to the recognizer.
///
/// Samples are 16-bit signed mono at the session's fixed sample rate. Chunks
/// are immutable once captured; the recognizer retains no reference after a
/// feed call.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// PCM samples (16-bit signed integers).
    pub samples: Vec<i16>,
    /// Sequence number for ordering and gap detection.
    pub sequence: u64,
}

impl AudioChunk {
    /// Creates a new audio chunk.
    pub fn new(samples: Vec<i16>, sequence: u64) -> Self {
        Self { samples, sequence }
    }
}

/// Which kind of raw payload the engine produced for a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Ongoing utterance; text is provisional.
    Partial,
    /// Utterance boundary detected; text is committed.
    Final,
}

/// A decoded recognition result.
///
/// `Partial` text may be revised or replaced by a later `Partial`, or
/// superseded by a `Final`. `Final` text is committed and never revised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Partial(String),
    Final(String),
}

impl RecognitionEvent {
    /// The text carried by the event. Empty text means "nothing to display".
    pub fn text(&self) -> &str {
        match self {
            RecognitionEvent::Partial(text) | RecognitionEvent::Final(text) => text,
        }
    }

    /// Returns true for `Final` events.
    pub fn is_final(&self) -> bool {
        matches!(self, RecognitionEvent::Final(_))
    }
}
