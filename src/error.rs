//! Component-local typed errors (spec §7). Each enum covers exactly the
//! failure modes its component's policy table names; callers log and
//! continue per the Action column rather than propagating these out of
//! a scan cycle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to parse manifest JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to persist manifest: {0}")]
    Save(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("transcript document at {path} unreadable: {source}")]
    DocumentRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("transcript document at {path} malformed: {source}")]
    DocumentParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to move/delete audio for {stem}: {source}")]
    AudioDisposition {
        stem: String,
        #[source]
        source: std::io::Error,
    },
    #[error("curator writer failed for {stem}: {source}")]
    WriterFailed {
        stem: String,
        #[source]
        source: CuratorWriterError,
    },
    #[error("conversation stitching failed: {0}")]
    StitchFailed(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to copy {source_path} to staging: {source}")]
    StagingCopy {
        source_path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("file {path} did not stabilize after {attempts} attempts")]
    Instability { path: String, attempts: u32 },
    #[error("failed to hash staging file {path}: {source}")]
    Hash {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("transcode of {path} failed: {reason}")]
    Transcode { path: String, reason: String },
    #[error("transcode of {path} timed out after {timeout_sec}s")]
    TranscodeTimeout { path: String, timeout_sec: u64 },
    #[error("failed to persist ledger: {0}")]
    LedgerSave(#[source] std::io::Error),
    #[error("watched directory {0} is missing")]
    WatchedDirMissing(String),
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("candidate {0} not found")]
    CandidateNotFound(String),
    #[error("candidate {0} is not pending review")]
    CandidateNotPending(String),
    #[error("merge requires at least 2 candidates, got {0}")]
    NotEnoughCandidates(usize),
    #[error("profile {0} not found")]
    ProfileNotFound(String),
    #[error("profile {0} already exists")]
    ProfileExists(String),
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("invalid speaker id: {0}")]
    InvalidSpeakerId(String),
    #[error("embeddings have mismatched dimensions ({a} vs {b})")]
    DimensionMismatch { a: usize, b: usize },
    #[error("merged embedding norm is zero")]
    ZeroNorm,
    #[error("embedding service call failed: {0}")]
    EmbeddingService(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CuratorWriterError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write curator file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create sync marker {path}: {source}")]
    Marker {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no free filename found after {attempts} collision attempts")]
    NoFreeName { attempts: u32 },
}
