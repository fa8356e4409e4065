//! Data model shared by every component: the filesystem entities from
//! spec §3 (audio files, transcript documents, job entries, speaker
//! candidates and profiles) plus the status lattice.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where an audio file's WAV representation currently lives, or that it
/// has none (deleted or never ingested).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioLocation {
    Inbox,
    Playback,
    None,
}

/// Where a stem's audio originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    Microphone,
    WatchFolder,
}

impl AudioSource {
    /// Classify a stem by its naming convention (§3: `gdrive_` prefix for
    /// watch-folder ingests, anything else from the microphone recorder).
    pub fn from_stem(stem: &str) -> Self {
        if stem.starts_with("gdrive_") {
            AudioSource::WatchFolder
        } else {
            AudioSource::Microphone
        }
    }
}

/// A single diarized utterance within a transcript document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub speaker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
}

/// The `speaker_identification` object within a transcript document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakerIdentification {
    #[serde(default)]
    pub identified: HashMap<String, String>,
    #[serde(default)]
    pub unidentified: Vec<String>,
    /// Maps a speaker id to the candidate/profile id it currently
    /// resolves to; used by the retroactive re-tag on candidate approval.
    #[serde(default)]
    pub stable_ids: HashMap<String, String>,
}

impl SpeakerIdentification {
    pub fn is_fully_identified(&self) -> bool {
        self.unidentified.is_empty()
    }
}

/// The subset of `assemblyai.*` fields the core consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblyAiInfo {
    #[serde(default)]
    pub audio_duration: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Pipeline status values reported by the external ASR, exactly as
/// produced in `done/<stem>.json` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentPipelineStatus {
    Transcribed,
    Complete,
    CompleteNoSpeakerId,
    SpeakerIdFailed,
    SkippedTooShort,
}

/// A JSON document at `done/<stem>.json`, produced by the external ASR
/// and thereafter mutated only by the core (speaker labels, merges) -
/// never rewritten wholesale by the ASR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptDocument {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub pipeline_status: Option<DocumentPipelineStatus>,
    #[serde(default)]
    pub speaker_identification: SpeakerIdentification,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub assemblyai: AssemblyAiInfo,
    #[serde(default)]
    pub diarization: Option<serde_json::Value>,
    /// Any ASR-owned fields this core doesn't model by name are preserved
    /// verbatim on round-trip rather than silently dropped.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TranscriptDocument {
    /// Fallback duration when `assemblyai.audio_duration` is absent:
    /// the maximum segment end time (spec §4.3 Phase C).
    pub fn effective_duration(&self) -> f64 {
        self.assemblyai.audio_duration.unwrap_or_else(|| {
            self.segments
                .iter()
                .map(|s| s.end)
                .fold(0.0_f64, f64::max)
        })
    }
}

/// Status lattice values for a `JobEntry` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    SpeakerIdPending,
    SpeakerIdFailed,
    Complete,
    PendingCurator,
    CuratorSynced,
    Skipped,
    Failed,
}

/// The four nullable milestone timestamps tracked per job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStages {
    #[serde(default)]
    pub ingested: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub transcribed: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub speaker_id: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub curator_synced: Option<chrono::DateTime<chrono::Utc>>,
}

/// A single entry in the Job Manifest, keyed externally by stem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEntry {
    pub source: AudioSource,
    pub audio_file: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub status: JobStatus,
    #[serde(default)]
    pub stages: JobStages,
    #[serde(default)]
    pub speaker_identification: SpeakerIdentification,
    #[serde(default)]
    pub playback_file: Option<String>,
    #[serde(default)]
    pub curator_path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobEntry {
    pub fn new_queued(stem: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            source: AudioSource::from_stem(stem),
            audio_file: format!("{stem}.wav"),
            created_at: now,
            status: JobStatus::Queued,
            stages: JobStages {
                ingested: Some(now),
                ..Default::default()
            },
            speaker_identification: SpeakerIdentification::default(),
            playback_file: None,
            curator_path: None,
            error: None,
        }
    }
}

/// Status for a `SpeakerCandidate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    PendingReview,
    Approved,
    Rejected,
    Merged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleMetadata {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub transcript: String,
    #[serde(default)]
    pub audio_file: Option<String>,
}

/// `candidates/<speaker-id>.json`, created by the external embedding
/// service, state-transitioned only by the Speaker Identity Service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerCandidate {
    pub speaker_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub num_samples: u32,
    pub variance: f64,
    pub avg_embedding: Vec<f32>,
    #[serde(default)]
    pub sample_metadata: Vec<SampleMetadata>,
    pub status: CandidateStatus,
    #[serde(default)]
    pub rejected_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub merged_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub merged_into: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentMethod {
    Manual,
    Automatic,
    Merged,
}

/// `profiles/<name>.json`, created and deleted only by the Speaker
/// Identity Service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerProfile {
    pub name: String,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub enrollment_method: EnrollmentMethod,
    pub num_samples: u32,
    pub embedding_dimensions: usize,
    pub embeddings: Vec<Vec<f32>>,
    pub threshold: f32,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl SpeakerProfile {
    pub const DEFAULT_THRESHOLD: f32 = 0.25;
}

/// Name validation shared by profile/candidate name inputs (spec §9,
/// "name sanitization"): lower-cased, restricted to
/// `[A-Za-z0-9 _'-]`. Reject at input, never rewrite.
pub fn is_valid_identity_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '\'' | '-'))
}

/// Speaker-id validation for §4.5.1: `[A-Za-z0-9_-]+`.
pub fn is_valid_speaker_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
}
