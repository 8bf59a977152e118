//! Parsing of raw recognizer payloads into recognition events.
//!
//! The decoding engine reports results as small JSON documents: final
//! results carry a `text` field, partial results a `partial` field. A
//! missing field or an empty string both mean "nothing to display" and
//! produce an event with empty text rather than an error.

use crate::error::{Result, VoxlineError};
use crate::events::{RecognitionEvent, ResultKind};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct FinalPayload {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct PartialPayload {
    #[serde(default)]
    partial: String,
}

/// Parses a raw engine payload into a [`RecognitionEvent`].
///
/// # Errors
/// Returns `VoxlineError::MalformedResult` when the payload is not valid
/// JSON. Callers treat this as non-fatal: log the error, drop the event,
/// continue with the next chunk.
pub fn parse_result(raw: &[u8], kind: ResultKind) -> Result<RecognitionEvent> {
    match kind {
        ResultKind::Final => {
            let payload: FinalPayload =
                serde_json::from_slice(raw).map_err(|e| VoxlineError::MalformedResult {
                    message: e.to_string(),
                })?;
            Ok(RecognitionEvent::Final(payload.text))
        }
        ResultKind::Partial => {
            let payload: PartialPayload =
                serde_json::from_slice(raw).map_err(|e| VoxlineError::MalformedResult {
                    message: e.to_string(),
                })?;
            Ok(RecognitionEvent::Partial(payload.partial))
        }
    }
}
