//! Speaker Identity Service (C6, spec §4.5): labeling, candidate
//! review, profile lifecycle, and the retroactive re-tag that follows a
//! candidate approval or merge.
//!
//! CRUD method shapes grounded on
//! `rmorse-voicetestrs/tauri/src-tauri/src/database/repository.rs`
//! (load-mutate-save per entity, one method per operation), translated
//! from SQL rows to the candidate/profile JSON documents this spec
//! uses. Per-filename serialization uses `parking_lot::Mutex`, a
//! teacher dependency already present for its own state guards.

use crate::config::Config;
use crate::embedding_client::EmbeddingClient;
use crate::error::IdentityError;
use crate::model::{
    is_valid_identity_name, is_valid_speaker_id, CandidateStatus, EnrollmentMethod,
    SpeakerCandidate, SpeakerProfile, TranscriptDocument,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Serializes mutations to a given transcript file so that concurrent
/// label/approve calls for the same stem never race on a read-modify-
/// write cycle (spec §4.5, "per-filename mutex").
#[derive(Default)]
struct FileLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileLocks {
    fn lock_for(&self, stem: &str) -> Arc<Mutex<()>> {
        let mut map = self.locks.lock();
        map.entry(stem.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

pub struct IdentityService {
    cfg: Config,
    embedding_client: EmbeddingClient,
    file_locks: FileLocks,
}

impl IdentityService {
    pub fn new(cfg: Config) -> Self {
        let embedding_client = EmbeddingClient::new(cfg.embedding_service_url.clone());
        Self {
            cfg,
            embedding_client,
            file_locks: FileLocks::default(),
        }
    }

    /// Label a speaker within one transcript: delegate to the external
    /// embedding service to fold the sample into a profile, then update
    /// `speaker_identification` in place so the next Orchestrator scan
    /// picks up the admission immediately rather than waiting a cycle
    /// (spec §4.5.1 - an optimization; the Orchestrator remains
    /// authoritative for state derivation).
    pub async fn label_speaker(
        &self,
        stem: &str,
        speaker_id: &str,
        name: &str,
    ) -> Result<(), IdentityError> {
        if !is_valid_speaker_id(speaker_id) {
            return Err(IdentityError::InvalidSpeakerId(speaker_id.to_string()));
        }
        if !is_valid_identity_name(name) {
            return Err(IdentityError::InvalidName(name.to_string()));
        }

        self.embedding_client
            .label_speaker(stem, speaker_id, name)
            .await
            .map_err(|e| IdentityError::EmbeddingService(e.to_string()))?;

        // The network call above doesn't touch the document; only the
        // read-modify-write below needs serializing per filename, so the
        // lock guard never has to live across an `.await`.
        let file_lock = self.file_locks.lock_for(stem);
        let _guard = file_lock.lock();

        let doc_path = self.cfg.done_dir().join(format!("{stem}.json"));
        let marker_path = self.cfg.done_dir().join(format!("{stem}.json.synced"));

        let mut doc = read_document(&doc_path)?;
        doc.speaker_identification
            .identified
            .insert(speaker_id.to_string(), name.to_string());
        doc.speaker_identification
            .unidentified
            .retain(|s| s != speaker_id);
        doc.speaker_identification
            .stable_ids
            .insert(speaker_id.to_string(), name.to_string());
        for seg in &mut doc.segments {
            if seg.speaker == speaker_id {
                seg.speaker_name = Some(name.to_string());
            }
        }
        write_document(&doc_path, &doc)?;

        if marker_path.exists() {
            fs::remove_file(&marker_path)?;
            info!("cleared sync marker for {stem} after label, pending re-admission");
        }

        Ok(())
    }

    /// Approve a pending candidate: promote it to a profile (or fold its
    /// embedding into an existing one), then retag every transcript that
    /// references the candidate's speaker id.
    pub async fn approve_candidate(&self, speaker_id: &str, name: &str) -> Result<(), IdentityError> {
        if !is_valid_identity_name(name) {
            return Err(IdentityError::InvalidName(name.to_string()));
        }

        let candidate_path = self.cfg.candidates_dir().join(format!("{speaker_id}.json"));
        let mut candidate = read_candidate(&candidate_path)?;
        if candidate.status != CandidateStatus::PendingReview {
            return Err(IdentityError::CandidateNotPending(speaker_id.to_string()));
        }

        let profile_path = self.cfg.profiles_dir().join(format!("{name}.json"));
        let profile = if profile_path.exists() {
            let mut existing = read_profile(&profile_path)?;
            existing.embeddings.push(candidate.avg_embedding.clone());
            existing.num_samples += candidate.num_samples;
            existing
        } else {
            SpeakerProfile {
                name: name.to_string(),
                enrolled_at: chrono::Utc::now(),
                enrollment_method: EnrollmentMethod::Automatic,
                num_samples: candidate.num_samples,
                embedding_dimensions: candidate.avg_embedding.len(),
                embeddings: vec![candidate.avg_embedding.clone()],
                threshold: SpeakerProfile::DEFAULT_THRESHOLD,
                metadata: serde_json::Value::Null,
            }
        };
        write_profile(&profile_path, &profile)?;

        candidate.status = CandidateStatus::Approved;
        write_candidate(&candidate_path, &candidate)?;

        self.retag_everywhere(speaker_id, name).await?;
        info!("approved candidate {speaker_id} as profile {name}");
        Ok(())
    }

    pub fn reject_candidate(&self, speaker_id: &str) -> Result<(), IdentityError> {
        let candidate_path = self.cfg.candidates_dir().join(format!("{speaker_id}.json"));
        let mut candidate = read_candidate(&candidate_path)?;
        if candidate.status != CandidateStatus::PendingReview {
            return Err(IdentityError::CandidateNotPending(speaker_id.to_string()));
        }
        candidate.status = CandidateStatus::Rejected;
        candidate.rejected_at = Some(chrono::Utc::now());
        write_candidate(&candidate_path, &candidate)?;
        info!("rejected candidate {speaker_id}");
        Ok(())
    }

    /// Merge two or more pending candidates into a speaker profile (spec
    /// §4.5.4): mean+L2-normalize every source embedding, then either
    /// create a new profile or append to an existing one, and mark every
    /// source candidate `Merged`. Broadly invalidates every sync marker
    /// afterward, since a merge redefines identity rather than retagging
    /// a single speaker id.
    pub fn merge_candidates(
        &self,
        candidate_ids: &[&str],
        target: MergeTarget,
    ) -> Result<(), IdentityError> {
        if candidate_ids.len() < 2 {
            return Err(IdentityError::NotEnoughCandidates(candidate_ids.len()));
        }

        let mut candidates = Vec::with_capacity(candidate_ids.len());
        for id in candidate_ids {
            let path = self.cfg.candidates_dir().join(format!("{id}.json"));
            let candidate = read_candidate(&path)?;
            if candidate.status != CandidateStatus::PendingReview {
                return Err(IdentityError::CandidateNotPending(id.to_string()));
            }
            candidates.push(candidate);
        }

        let dim = candidates[0].avg_embedding.len();
        for candidate in &candidates[1..] {
            if candidate.avg_embedding.len() != dim {
                return Err(IdentityError::DimensionMismatch {
                    a: dim,
                    b: candidate.avg_embedding.len(),
                });
            }
        }

        let embeddings: Vec<Vec<f32>> = candidates.iter().map(|c| c.avg_embedding.clone()).collect();
        let merged = mean_normalize_all(&embeddings)?;
        let sample_count = candidates.len() as u32;

        let profile_name = match &target {
            MergeTarget::New { name } => {
                if !is_valid_identity_name(name) {
                    return Err(IdentityError::InvalidName(name.to_string()));
                }
                let profile_path = self.cfg.profiles_dir().join(format!("{name}.json"));
                if profile_path.exists() {
                    return Err(IdentityError::ProfileExists(name.to_string()));
                }
                let profile = SpeakerProfile {
                    name: name.to_string(),
                    enrolled_at: chrono::Utc::now(),
                    enrollment_method: EnrollmentMethod::Merged,
                    num_samples: sample_count,
                    embedding_dimensions: dim,
                    embeddings: vec![merged],
                    threshold: SpeakerProfile::DEFAULT_THRESHOLD,
                    metadata: serde_json::json!({ "source_candidate_ids": candidate_ids }),
                };
                write_profile(&profile_path, &profile)?;
                name.clone()
            }
            MergeTarget::Existing { profile_name } => {
                let profile_path = self.cfg.profiles_dir().join(format!("{profile_name}.json"));
                let mut profile = read_profile(&profile_path)?;
                profile.embeddings.push(merged);
                profile.num_samples += sample_count;
                write_profile(&profile_path, &profile)?;
                profile_name.clone()
            }
        };

        let now = chrono::Utc::now();
        for (id, mut candidate) in candidate_ids.iter().zip(candidates.into_iter()) {
            let path = self.cfg.candidates_dir().join(format!("{id}.json"));
            candidate.status = CandidateStatus::Merged;
            candidate.merged_at = Some(now);
            candidate.merged_into = Some(profile_name.clone());
            write_candidate(&path, &candidate)?;
        }

        self.invalidate_markers()?;
        info!("merged {} candidates into profile {profile_name}", candidate_ids.len());
        Ok(())
    }

    pub fn rename_profile(&self, old_name: &str, new_name: &str) -> Result<(), IdentityError> {
        if !is_valid_identity_name(new_name) {
            return Err(IdentityError::InvalidName(new_name.to_string()));
        }
        let old_path = self.cfg.profiles_dir().join(format!("{old_name}.json"));
        let new_path = self.cfg.profiles_dir().join(format!("{new_name}.json"));
        if !old_path.exists() {
            return Err(IdentityError::ProfileNotFound(old_name.to_string()));
        }
        if new_path.exists() {
            return Err(IdentityError::ProfileExists(new_name.to_string()));
        }

        let mut profile = read_profile(&old_path)?;
        profile.name = new_name.to_string();
        write_profile(&new_path, &profile)?;
        fs::remove_file(&old_path)?;
        info!("renamed profile {old_name} -> {new_name}");
        Ok(())
    }

    pub fn delete_profile(&self, name: &str) -> Result<(), IdentityError> {
        let path = self.cfg.profiles_dir().join(format!("{name}.json"));
        if !path.exists() {
            return Err(IdentityError::ProfileNotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        info!("deleted profile {name}");
        Ok(())
    }

    /// Retroactive re-tag on candidate approval (spec §4.5.2): scan every
    /// `.synced` marker and, where the referenced transcript's
    /// `speaker_identification.stable_ids` maps an unidentified speaker
    /// to this candidate's id, delete the marker so the Orchestrator
    /// re-evaluates it. This is deliberately targeted - contrast with
    /// the broad invalidation a merge performs.
    async fn retag_everywhere(&self, speaker_id: &str, _name: &str) -> Result<(), IdentityError> {
        let done_dir = self.cfg.done_dir();
        let Ok(read_dir) = fs::read_dir(&done_dir) else {
            return Ok(());
        };
        for entry in read_dir.flatten() {
            let marker_path = entry.path();
            let Some(marker_name) = marker_path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(stem) = marker_name.strip_suffix(".json.synced") else {
                continue;
            };

            let doc_path = done_dir.join(format!("{stem}.json"));
            let doc = match read_document(&doc_path) {
                Ok(d) => d,
                Err(_) => continue,
            };

            let retags = doc
                .speaker_identification
                .unidentified
                .iter()
                .any(|unident| doc.speaker_identification.stable_ids.get(unident).map(String::as_str) == Some(speaker_id));
            if retags {
                fs::remove_file(&marker_path)?;
                info!("retroactively invalidated {stem} after approving {speaker_id}");
            }
        }
        Ok(())
    }

    /// Broad invalidation after a merge (spec §4.5.4): a merge redefines
    /// identity, so every `.synced` marker currently present is deleted,
    /// not just ones mentioning the merged candidates - correctness over
    /// precision, per spec §9.
    fn invalidate_markers(&self) -> Result<(), IdentityError> {
        let done_dir = self.cfg.done_dir();
        let Ok(read_dir) = fs::read_dir(&done_dir) else {
            return Ok(());
        };
        for entry in read_dir.flatten() {
            let path = entry.path();
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if filename.ends_with(".json.synced") {
                fs::remove_file(&path)?;
            }
        }
        warn!("merge invalidated every sync marker in done/");
        Ok(())
    }
}

/// Where a merge's combined embedding goes (spec §4.5.4).
pub enum MergeTarget {
    New { name: String },
    Existing { profile_name: String },
}

fn mean_normalize_all(embeddings: &[Vec<f32>]) -> Result<Vec<f32>, IdentityError> {
    let dim = embeddings[0].len();
    let count = embeddings.len() as f32;
    let mut mean = vec![0.0f32; dim];
    for embedding in embeddings {
        for (m, x) in mean.iter_mut().zip(embedding.iter()) {
            *m += x / count;
        }
    }
    let norm = mean.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return Err(IdentityError::ZeroNorm);
    }
    Ok(mean.iter().map(|x| x / norm).collect())
}

fn read_document(path: &PathBuf) -> Result<TranscriptDocument, IdentityError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_document(path: &PathBuf, doc: &TranscriptDocument) -> Result<(), IdentityError> {
    let json = serde_json::to_string_pretty(doc)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_candidate(path: &PathBuf) -> Result<SpeakerCandidate, IdentityError> {
    if !path.exists() {
        return Err(IdentityError::CandidateNotFound(
            path.file_stem().and_then(|s| s.to_str()).unwrap_or("?").to_string(),
        ));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_candidate(path: &PathBuf, candidate: &SpeakerCandidate) -> Result<(), IdentityError> {
    let json = serde_json::to_string_pretty(candidate)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_profile(path: &PathBuf) -> Result<SpeakerProfile, IdentityError> {
    if !path.exists() {
        return Err(IdentityError::ProfileNotFound(
            path.file_stem().and_then(|s| s.to_str()).unwrap_or("?").to_string(),
        ));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_profile(path: &PathBuf, profile: &SpeakerProfile) -> Result<(), IdentityError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SampleMetadata;

    fn test_config(dir: &std::path::Path) -> Config {
        let mut cfg = Config::default();
        cfg.audio_root = dir.join("audio");
        cfg.curator_root = dir.join("curator");
        cfg.profile_root = dir.join("profiles");
        cfg.state_root = dir.join("state");
        fs::create_dir_all(cfg.done_dir()).unwrap();
        fs::create_dir_all(cfg.candidates_dir()).unwrap();
        fs::create_dir_all(cfg.profiles_dir()).unwrap();
        cfg
    }

    fn sample_candidate(speaker_id: &str) -> SpeakerCandidate {
        SpeakerCandidate {
            speaker_id: speaker_id.to_string(),
            created_at: chrono::Utc::now(),
            num_samples: 3,
            variance: 0.01,
            avg_embedding: vec![0.1, 0.2, 0.3],
            sample_metadata: vec![SampleMetadata {
                timestamp: chrono::Utc::now(),
                transcript: "hello".into(),
                audio_file: None,
            }],
            status: CandidateStatus::PendingReview,
            rejected_at: None,
            merged_at: None,
            merged_into: None,
        }
    }

    #[test]
    fn reject_candidate_marks_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let candidate = sample_candidate("SPEAKER_07");
        write_candidate(
            &cfg.candidates_dir().join("SPEAKER_07.json"),
            &candidate,
        )
        .unwrap();

        let svc = IdentityService::new(cfg.clone());
        svc.reject_candidate("SPEAKER_07").unwrap();

        let reloaded = read_candidate(&cfg.candidates_dir().join("SPEAKER_07.json")).unwrap();
        assert_eq!(reloaded.status, CandidateStatus::Rejected);
        assert!(reloaded.rejected_at.is_some());
    }

    #[test]
    fn reject_already_resolved_candidate_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let mut candidate = sample_candidate("SPEAKER_08");
        candidate.status = CandidateStatus::Rejected;
        write_candidate(&cfg.candidates_dir().join("SPEAKER_08.json"), &candidate).unwrap();

        let svc = IdentityService::new(cfg);
        let result = svc.reject_candidate("SPEAKER_08");
        assert!(matches!(result, Err(IdentityError::CandidateNotPending(_))));
    }

    #[tokio::test]
    async fn approve_candidate_retags_only_via_stable_ids() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_candidate(&cfg.candidates_dir().join("SPEAKER_09.json"), &sample_candidate("SPEAKER_09")).unwrap();

        // Targeted: stable_ids maps SPEAKER_01 -> SPEAKER_09, so this one retags.
        let targeted = r#"{
            "timestamp": "2026-03-01T09:00:00Z",
            "pipeline_status": "complete",
            "speaker_identification": {"identified": {}, "unidentified": ["SPEAKER_01"], "stable_ids": {"SPEAKER_01": "SPEAKER_09"}},
            "segments": [],
            "assemblyai": {"audio_duration": 1.0, "status": "completed"}
        }"#;
        fs::write(cfg.done_dir().join("rec_targeted.json"), targeted).unwrap();
        fs::write(cfg.done_dir().join("rec_targeted.json.synced"), b"").unwrap();

        // Unrelated: different stable_ids mapping, should not be touched.
        let unrelated = r#"{
            "timestamp": "2026-03-01T09:00:00Z",
            "pipeline_status": "complete",
            "speaker_identification": {"identified": {}, "unidentified": ["SPEAKER_02"], "stable_ids": {"SPEAKER_02": "SPEAKER_99"}},
            "segments": [],
            "assemblyai": {"audio_duration": 1.0, "status": "completed"}
        }"#;
        fs::write(cfg.done_dir().join("rec_unrelated.json"), unrelated).unwrap();
        fs::write(cfg.done_dir().join("rec_unrelated.json.synced"), b"").unwrap();

        let svc = IdentityService::new(cfg.clone());
        svc.approve_candidate("SPEAKER_09", "fred")
            .await
            .unwrap_or_else(|e| panic!("{e}"));

        assert!(!cfg.done_dir().join("rec_targeted.json.synced").exists());
        assert!(cfg.done_dir().join("rec_unrelated.json.synced").exists());
        assert!(cfg.profiles_dir().join("fred.json").exists());
    }

    #[test]
    fn merge_candidates_creates_new_profile_and_invalidates_markers() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());

        write_candidate(&cfg.candidates_dir().join("SPEAKER_01.json"), &sample_candidate("SPEAKER_01")).unwrap();
        write_candidate(&cfg.candidates_dir().join("SPEAKER_02.json"), &sample_candidate("SPEAKER_02")).unwrap();

        let doc_json = r#"{
            "timestamp": "2026-03-01T09:00:00Z",
            "pipeline_status": "complete",
            "speaker_identification": {"identified": {}, "unidentified": ["SPEAKER_01"]},
            "segments": [{"start": 0.0, "end": 1.0, "text": "hi", "speaker": "SPEAKER_01", "speaker_name": null}],
            "assemblyai": {"audio_duration": 1.0, "status": "completed"}
        }"#;
        fs::write(cfg.done_dir().join("rec_a.json"), doc_json).unwrap();
        fs::write(cfg.done_dir().join("rec_a.json.synced"), b"").unwrap();

        let svc = IdentityService::new(cfg.clone());
        svc.merge_candidates(
            &["SPEAKER_01", "SPEAKER_02"],
            MergeTarget::New { name: "fred".into() },
        )
        .unwrap();

        assert!(!cfg.done_dir().join("rec_a.json.synced").exists());

        let profile = read_profile(&cfg.profiles_dir().join("fred.json")).unwrap();
        assert_eq!(profile.enrollment_method, EnrollmentMethod::Merged);
        assert_eq!(profile.embeddings.len(), 1);
        assert_eq!(profile.num_samples, 2);

        for id in ["SPEAKER_01", "SPEAKER_02"] {
            let candidate = read_candidate(&cfg.candidates_dir().join(format!("{id}.json"))).unwrap();
            assert_eq!(candidate.status, CandidateStatus::Merged);
            assert_eq!(candidate.merged_into.as_deref(), Some("fred"));
        }
    }

    #[test]
    fn merge_candidates_appends_to_existing_profile() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());

        write_candidate(&cfg.candidates_dir().join("SPEAKER_03.json"), &sample_candidate("SPEAKER_03")).unwrap();
        write_candidate(&cfg.candidates_dir().join("SPEAKER_04.json"), &sample_candidate("SPEAKER_04")).unwrap();

        let profile = SpeakerProfile {
            name: "amy".into(),
            enrolled_at: chrono::Utc::now(),
            enrollment_method: EnrollmentMethod::Manual,
            num_samples: 4,
            embedding_dimensions: 3,
            embeddings: vec![vec![0.1, 0.2, 0.3]],
            threshold: SpeakerProfile::DEFAULT_THRESHOLD,
            metadata: serde_json::Value::Null,
        };
        write_profile(&cfg.profiles_dir().join("amy.json"), &profile).unwrap();

        let svc = IdentityService::new(cfg.clone());
        svc.merge_candidates(
            &["SPEAKER_03", "SPEAKER_04"],
            MergeTarget::Existing { profile_name: "amy".into() },
        )
        .unwrap();

        let reloaded = read_profile(&cfg.profiles_dir().join("amy.json")).unwrap();
        assert_eq!(reloaded.embeddings.len(), 2);
        assert_eq!(reloaded.num_samples, 6);
    }

    #[test]
    fn merge_candidates_requires_at_least_two() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_candidate(&cfg.candidates_dir().join("SPEAKER_05.json"), &sample_candidate("SPEAKER_05")).unwrap();

        let svc = IdentityService::new(cfg);
        let result = svc.merge_candidates(
            &["SPEAKER_05"],
            MergeTarget::New { name: "solo".into() },
        );
        assert!(matches!(result, Err(IdentityError::NotEnoughCandidates(1))));
    }

    #[test]
    fn rename_profile_rejects_collision() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let profile = SpeakerProfile {
            name: "fred".into(),
            enrolled_at: chrono::Utc::now(),
            enrollment_method: EnrollmentMethod::Manual,
            num_samples: 1,
            embedding_dimensions: 3,
            embeddings: vec![vec![0.1, 0.2, 0.3]],
            threshold: SpeakerProfile::DEFAULT_THRESHOLD,
            metadata: serde_json::Value::Null,
        };
        write_profile(&cfg.profiles_dir().join("fred.json"), &profile).unwrap();
        write_profile(&cfg.profiles_dir().join("amy.json"), &profile).unwrap();

        let svc = IdentityService::new(cfg);
        let result = svc.rename_profile("fred", "amy");
        assert!(matches!(result, Err(IdentityError::ProfileExists(_))));
    }

    #[test]
    fn delete_profile_missing_errors() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        let svc = IdentityService::new(cfg);
        let result = svc.delete_profile("ghost");
        assert!(matches!(result, Err(IdentityError::ProfileNotFound(_))));
    }
}
