//! Curator Gate (C3, spec §4.2): an absolute admission policy with no
//! state of its own - a pure predicate over a `TranscriptDocument`.

use crate::model::{DocumentPipelineStatus as P, TranscriptDocument};

/// A transcript is admissible to the curator iff every speaker is
/// identified and the document has reached one of the two terminal
/// "complete" statuses. Skipped and failed documents are never
/// admitted; documents with an empty `unidentified` list but a
/// non-terminal status are held until the terminal status arrives.
pub fn is_admissible(doc: &TranscriptDocument) -> bool {
    let terminal_complete = matches!(doc.pipeline_status, Some(P::Complete) | Some(P::CompleteNoSpeakerId));
    terminal_complete && doc.speaker_identification.is_fully_identified()
}
