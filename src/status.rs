//! Status derivation from a `TranscriptDocument` (spec §4.3, "Status
//! derivation"). Shared by the Job Manifest Store's `rebuild()` and the
//! Pipeline Orchestrator's Phase B so that both agree on the mapping -
//! this is exactly what spec testable property 2 (manifest
//! reconstruction) requires.

use crate::model::{DocumentPipelineStatus as P, JobStatus, TranscriptDocument};

/// Derive the job status a document implies, in the exact rule order
/// the spec lists (first match wins).
pub fn derive_status(doc: &TranscriptDocument) -> JobStatus {
    match doc.pipeline_status {
        Some(P::SkippedTooShort) => return JobStatus::Skipped,
        Some(P::Transcribed) => return JobStatus::SpeakerIdPending,
        Some(P::SpeakerIdFailed) => return JobStatus::SpeakerIdFailed,
        _ => {}
    }

    if doc.assemblyai.status.as_deref() == Some("error") {
        return JobStatus::Failed;
    }

    match doc.pipeline_status {
        Some(P::Complete) | Some(P::CompleteNoSpeakerId) => {
            return if doc.speaker_identification.is_fully_identified() {
                JobStatus::Complete
            } else {
                JobStatus::PendingCurator
            };
        }
        None if !doc.segments.is_empty() => return JobStatus::Complete,
        _ => {}
    }

    JobStatus::Processing
}

/// Whether this status has reached one of the three terminal forms that
/// trigger `stages.speaker_id` (spec §4.3 Phase B: "`speaker_id` when
/// `pipeline_status` is one of the three terminal forms").
pub fn is_terminal_pipeline_status(p: Option<P>) -> bool {
    matches!(
        p,
        Some(P::Complete) | Some(P::CompleteNoSpeakerId) | Some(P::SpeakerIdFailed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssemblyAiInfo, Segment, SpeakerIdentification};
    use chrono::Utc;
    use serde_json::Map;

    fn doc(
        pipeline_status: Option<P>,
        unidentified: Vec<&str>,
        assemblyai_status: Option<&str>,
        segments_nonempty: bool,
    ) -> TranscriptDocument {
        TranscriptDocument {
            timestamp: Utc::now(),
            pipeline_status,
            speaker_identification: SpeakerIdentification {
                identified: Default::default(),
                unidentified: unidentified.into_iter().map(String::from).collect(),
                stable_ids: Default::default(),
            },
            segments: if segments_nonempty {
                vec![Segment {
                    start: 0.0,
                    end: 1.0,
                    text: "hi".into(),
                    speaker: "SPEAKER_00".into(),
                    speaker_name: None,
                }]
            } else {
                vec![]
            },
            assemblyai: AssemblyAiInfo {
                audio_duration: None,
                status: assemblyai_status.map(String::from),
            },
            diarization: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn skipped_too_short() {
        assert_eq!(
            derive_status(&doc(Some(P::SkippedTooShort), vec![], None, false)),
            JobStatus::Skipped
        );
    }

    #[test]
    fn transcribed_is_pending_speaker_id() {
        assert_eq!(
            derive_status(&doc(Some(P::Transcribed), vec![], None, false)),
            JobStatus::SpeakerIdPending
        );
    }

    #[test]
    fn speaker_id_failed_status() {
        assert_eq!(
            derive_status(&doc(Some(P::SpeakerIdFailed), vec![], None, false)),
            JobStatus::SpeakerIdFailed
        );
    }

    #[test]
    fn asr_error_is_failed() {
        assert_eq!(
            derive_status(&doc(None, vec![], Some("error"), false)),
            JobStatus::Failed
        );
    }

    #[test]
    fn complete_with_no_unidentified_is_complete() {
        assert_eq!(
            derive_status(&doc(Some(P::Complete), vec![], None, false)),
            JobStatus::Complete
        );
    }

    #[test]
    fn complete_with_unidentified_is_pending_curator() {
        assert_eq!(
            derive_status(&doc(Some(P::Complete), vec!["SPEAKER_01"], None, false)),
            JobStatus::PendingCurator
        );
    }

    #[test]
    fn legacy_document_with_segments_is_complete() {
        assert_eq!(derive_status(&doc(None, vec![], None, true)), JobStatus::Complete);
    }

    #[test]
    fn otherwise_processing() {
        assert_eq!(derive_status(&doc(None, vec![], None, false)), JobStatus::Processing);
    }
}
