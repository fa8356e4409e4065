//! Pipeline Orchestrator (C4, spec §4.3): the central single-threaded
//! cooperative scheduler. Runs `rebuild()` on startup, then a periodic
//! scan with phases A through G executed in fixed order.
//!
//! Grounded on `rmorse-voicetestrs/tauri/src-tauri/src/sync/mod.rs`'s
//! `FileSystemSync::sync_filesystem` scan-and-reconcile shape and
//! `.../queue_manager.rs`'s periodic-loop idiom. A pluggable
//! `PipelineStep` trait (as in `wingedonezero-Video-Sync-GUI`'s
//! `orchestrator/pipeline.rs`) was considered and rejected - see
//! SPEC_FULL.md §4 and DESIGN.md.

use crate::config::Config;
use crate::curator_writer::CuratorWriter;
use crate::error::OrchestratorError;
use crate::manifest::{JobManifestStore, ManifestMap};
use crate::model::{JobEntry, JobStages, JobStatus, TranscriptDocument};
use crate::status::{derive_status, is_terminal_pipeline_status};
use std::fs;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// The conversation-stitching hook. Its actual adjacency semantics are
/// explicitly delegated to an external helper, out of scope here (spec
/// §9); the default implementation is a documented no-op.
pub type StitchFn = Box<dyn Fn(&ManifestMap) -> anyhow::Result<()> + Send + Sync>;

fn default_stitch(_entries: &ManifestMap) -> anyhow::Result<()> {
    Ok(())
}

pub struct Orchestrator {
    cfg: Config,
    manifest: JobManifestStore,
    stitch_fn: StitchFn,
}

impl Orchestrator {
    /// Start from a fresh `rebuild()`, as the spec requires on startup.
    pub fn new(cfg: Config) -> Self {
        let manifest = JobManifestStore::rebuild(&cfg);
        Self {
            cfg,
            manifest,
            stitch_fn: Box::new(default_stitch),
        }
    }

    pub fn with_stitch_fn(mut self, f: StitchFn) -> Self {
        self.stitch_fn = f;
        self
    }

    pub fn manifest(&self) -> &ManifestMap {
        self.manifest.get_all()
    }

    /// Run the scan loop forever at `cfg.poll_interval_sec`.
    pub async fn run_forever(mut self) {
        let interval = Duration::from_secs(self.cfg.poll_interval_sec.max(1));
        loop {
            if let Err(e) = self.scan_once() {
                error!("orchestrator scan cycle failed: {e}");
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Run a single scan cycle. Returns whether any mutation occurred.
    pub fn scan_once(&mut self) -> Result<bool, OrchestratorError> {
        let mut mutated = false;

        mutated |= self.phase_a_discover();
        let transitions = self.phase_b_apply_document_state();
        mutated |= !transitions.is_empty();
        mutated |= self.phase_c_audio_disposition();
        mutated |= self.phase_d_curator_admission();
        mutated |= self.phase_e_orphan_cleanup();

        if mutated {
            if let Err(e) = (self.stitch_fn)(self.manifest.get_all()) {
                warn!("conversation stitching failed: {e}");
            }
            self.manifest.save()?;
        }

        Ok(mutated)
    }

    /// Phase A - Discover: every `*.wav` in `inbox/` without a manifest
    /// entry becomes a `queued` JobEntry.
    fn phase_a_discover(&mut self) -> bool {
        let Ok(read_dir) = fs::read_dir(self.cfg.inbox_dir()) else {
            return false;
        };
        let mut mutated = false;
        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("wav") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if self.manifest.get(stem).is_none() {
                debug!("discovered new inbox file: {stem}");
                self.manifest.upsert(stem.to_string(), JobEntry::new_queued(stem));
                mutated = true;
            }
        }
        mutated
    }

    /// Phase B - Apply document state: for every readable
    /// `done/<stem>.json`, derive the new status and update stages,
    /// honoring the marker-disappeared re-evaluation rule.
    ///
    /// Returns `(stem, old_status, new_status)` for every stem whose
    /// status was (re-)computed this cycle, for Phase C to consume.
    fn phase_b_apply_document_state(&mut self) -> Vec<(String, JobStatus, JobStatus)> {
        let mut transitions = Vec::new();
        let Ok(read_dir) = fs::read_dir(self.cfg.done_dir()) else {
            return transitions;
        };

        for entry in read_dir.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') || !name.ends_with(".json") || name.contains(".error.") {
                continue;
            }
            let stem = name.trim_end_matches(".json").to_string();

            let doc = match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<TranscriptDocument>(&content) {
                    Ok(doc) => doc,
                    Err(e) => {
                        warn!("malformed document {}: {e}", path.display());
                        continue;
                    }
                },
                Err(e) => {
                    warn!("unreadable document {}: {e}", path.display());
                    continue;
                }
            };

            let raw_status = derive_status(&doc);
            let old_entry = self.manifest.get(&stem).cloned();
            let old_status = old_entry.as_ref().map(|e| e.status);
            let marker_path = self.cfg.done_dir().join(format!("{stem}.json.synced"));
            let marker_present = marker_path.exists();

            // Marker disappeared while we still think we're synced: force
            // re-evaluation as if no prior sync existed.
            let force_reeval = old_status == Some(JobStatus::CuratorSynced) && !marker_present;

            // `derive_status` never yields `CuratorSynced` - that state is
            // layered on top once the marker exists, same as rebuild()'s
            // `build_entry_for_stem`. Fold it in here so an unchanged,
            // already-synced document doesn't look like a fresh transition.
            let new_status = if raw_status == JobStatus::Complete && marker_present && !force_reeval {
                JobStatus::CuratorSynced
            } else {
                raw_status
            };

            if old_status == Some(new_status) && !force_reeval {
                continue;
            }

            let old_stages = old_entry.as_ref().map(|e| e.stages.clone()).unwrap_or_default();
            let terminal = is_terminal_pipeline_status(doc.pipeline_status);
            let asr_completed = doc.assemblyai.status.as_deref() == Some("completed");
            let stages = JobStages {
                ingested: old_stages.ingested.or(Some(doc.timestamp)),
                transcribed: old_stages.transcribed.or(if asr_completed { Some(doc.timestamp) } else { None }),
                speaker_id: old_stages.speaker_id.or(if terminal { Some(doc.timestamp) } else { None }),
                curator_synced: if force_reeval { None } else { old_stages.curator_synced },
            };

            let error = if new_status == JobStatus::Failed {
                Some("ASR reported assemblyai.status = \"error\"".to_string())
            } else {
                None
            };

            let entry = JobEntry {
                source: crate::model::AudioSource::from_stem(&stem),
                audio_file: format!("{stem}.wav"),
                created_at: old_entry.as_ref().map(|e| e.created_at).unwrap_or(doc.timestamp),
                status: new_status,
                stages,
                speaker_identification: doc.speaker_identification.clone(),
                playback_file: old_entry.as_ref().and_then(|e| e.playback_file.clone()),
                curator_path: if force_reeval {
                    None
                } else {
                    old_entry.as_ref().and_then(|e| e.curator_path.clone())
                },
                error,
            };

            self.manifest.upsert(stem.clone(), entry);
            transitions.push((stem, old_status.unwrap_or(JobStatus::Queued), new_status));
        }

        transitions
    }

    /// Phase C - Audio disposition: for every stem whose current status
    /// has left `{queued, processing}`, move the WAV to `playback/` if
    /// long enough, else delete it; an ASR error (`failed`) always
    /// deletes the WAV regardless of duration (spec §4.3/§7 failure
    /// table). Driven off the manifest rather than this cycle's
    /// transitions so a stem whose terminal status was already
    /// reflected by `rebuild()` (e.g. after a crash, before its audio
    /// was ever disposed of) still gets disposed of.
    fn phase_c_audio_disposition(&mut self) -> bool {
        let mut mutated = false;
        let stems: Vec<(String, JobStatus)> = self
            .manifest
            .get_all()
            .iter()
            .filter(|(_, e)| !matches!(e.status, JobStatus::Queued | JobStatus::Processing))
            .map(|(stem, e)| (stem.clone(), e.status))
            .collect();

        for (stem, status) in stems {
            let inbox_path = self.cfg.inbox_dir().join(format!("{stem}.wav"));
            if !inbox_path.exists() {
                continue; // already disposed of; idempotent
            }

            let doc_path = self.cfg.done_dir().join(format!("{stem}.json"));
            let duration = fs::read_to_string(&doc_path)
                .ok()
                .and_then(|s| serde_json::from_str::<TranscriptDocument>(&s).ok())
                .map(|d| d.effective_duration())
                .unwrap_or(0.0);

            if status != JobStatus::Failed && duration >= self.cfg.min_playback_duration_sec {
                let playback_path = self.cfg.playback_dir().join(format!("{stem}.wav"));
                if let Some(parent) = playback_path.parent() {
                    let _ = fs::create_dir_all(parent);
                }
                match fs::rename(&inbox_path, &playback_path) {
                    Ok(()) => {
                        if let Some(entry) = self.manifest_entry_mut(&stem) {
                            entry.playback_file = Some(format!("{stem}.wav"));
                        }
                        mutated = true;
                    }
                    Err(e) => warn!("failed to move {} to playback: {e}", inbox_path.display()),
                }
            } else {
                match fs::remove_file(&inbox_path) {
                    Ok(()) => mutated = true,
                    Err(e) => warn!("failed to delete short inbox file {}: {e}", inbox_path.display()),
                }
            }
        }
        mutated
    }

    /// Phase D - Curator admission: for stems in `complete`, invoke the
    /// Curator Writer unless already marked `.synced`.
    fn phase_d_curator_admission(&mut self) -> bool {
        let mut mutated = false;
        let complete_stems: Vec<String> = self
            .manifest
            .get_all()
            .iter()
            .filter(|(_, e)| e.status == JobStatus::Complete)
            .map(|(stem, _)| stem.clone())
            .collect();

        for stem in complete_stems {
            let marker_path = self.cfg.done_dir().join(format!("{stem}.json.synced"));
            if marker_path.exists() {
                continue;
            }

            let doc_path = self.cfg.done_dir().join(format!("{stem}.json"));
            let doc = match fs::read_to_string(&doc_path)
                .ok()
                .and_then(|s| serde_json::from_str::<TranscriptDocument>(&s).ok())
            {
                Some(d) => d,
                None => continue,
            };

            match CuratorWriter::write(&self.cfg, &stem, &doc) {
                Ok(outcome) => {
                    if let Some(entry) = self.manifest_entry_mut(&stem) {
                        entry.curator_path = Some(outcome.path.display().to_string());
                        entry.stages.curator_synced = Some(chrono::Utc::now());
                        entry.status = JobStatus::CuratorSynced;
                    }
                    info!("published {stem} to curator");
                    mutated = true;
                }
                Err(e) => {
                    warn!("curator writer failed for {stem}: {e}; will retry next cycle");
                }
            }
        }
        mutated
    }

    /// Phase E - Orphan cleanup: inbox WAVs with no corresponding
    /// transcript document past `ORPHAN_AGE_HOURS` are deleted.
    fn phase_e_orphan_cleanup(&mut self) -> bool {
        let mut mutated = false;
        let Ok(read_dir) = fs::read_dir(self.cfg.inbox_dir()) else {
            return false;
        };
        let orphan_age = Duration::from_secs(self.cfg.orphan_age_hours * 3600);

        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("wav") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let doc_path = self.cfg.done_dir().join(format!("{stem}.json"));
            if doc_path.exists() {
                continue;
            }

            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let Ok(age) = modified.elapsed() else {
                continue;
            };
            if age < orphan_age {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    let hours = self.cfg.orphan_age_hours;
                    if let Some(e) = self.manifest_entry_mut(&stem) {
                        e.status = JobStatus::Failed;
                        e.error = Some(format!("Orphaned: no transcript after {hours}h"));
                    }
                    mutated = true;
                }
                Err(e) => warn!("failed to delete orphaned file {}: {e}", path.display()),
            }
        }
        mutated
    }

    fn manifest_entry_mut(&mut self, stem: &str) -> Option<&mut JobEntry> {
        self.manifest.entries_mut().get_mut(stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_config(dir: &std::path::Path) -> Config {
        let mut cfg = Config::default();
        cfg.audio_root = dir.join("audio");
        cfg.curator_root = dir.join("curator");
        cfg.profile_root = dir.join("profiles");
        cfg.state_root = dir.join("state");
        fs::create_dir_all(cfg.inbox_dir()).unwrap();
        fs::create_dir_all(cfg.done_dir()).unwrap();
        fs::create_dir_all(cfg.playback_dir()).unwrap();
        cfg
    }

    fn write_wav(cfg: &Config, stem: &str) {
        fs::write(cfg.inbox_dir().join(format!("{stem}.wav")), b"RIFF....").unwrap();
    }

    fn write_doc(cfg: &Config, stem: &str, json: &str) {
        fs::write(cfg.done_dir().join(format!("{stem}.json")), json).unwrap();
    }

    #[test]
    fn s1_happy_path_single_speaker() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_wav(&cfg, "rec_20260301_090000");
        write_doc(
            &cfg,
            "rec_20260301_090000",
            r#"{
                "timestamp": "2026-03-01T09:00:00Z",
                "pipeline_status": "complete",
                "speaker_identification": {"identified": {"SPEAKER_00": "fred"}, "unidentified": []},
                "segments": [{"start": 0.0, "end": 42.0, "text": "hi", "speaker": "SPEAKER_00", "speaker_name": "fred"}],
                "assemblyai": {"audio_duration": 42.0, "status": "completed"}
            }"#,
        );

        let mut orch = Orchestrator::new(cfg.clone());
        orch.scan_once().unwrap();

        assert!(!cfg.inbox_dir().join("rec_20260301_090000.wav").exists());
        assert!(cfg.playback_dir().join("rec_20260301_090000.wav").exists());
        assert_eq!(
            orch.manifest().get("rec_20260301_090000").unwrap().status,
            JobStatus::CuratorSynced
        );
        assert!(cfg
            .done_dir()
            .join("rec_20260301_090000.json.synced")
            .exists());
        let curator_file = cfg.curator_voice_dir().join("2026/03/01/09-00-00.json");
        assert!(curator_file.exists());
    }

    #[test]
    fn s2_skipped_short_audio() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_wav(&cfg, "rec_short");
        write_doc(
            &cfg,
            "rec_short",
            r#"{
                "timestamp": "2026-03-01T09:00:00Z",
                "pipeline_status": "skipped_too_short",
                "speaker_identification": {"identified": {}, "unidentified": []},
                "segments": [],
                "assemblyai": {"audio_duration": 3.0, "status": "completed"}
            }"#,
        );

        let mut orch = Orchestrator::new(cfg.clone());
        orch.scan_once().unwrap();

        assert!(!cfg.inbox_dir().join("rec_short.wav").exists());
        assert!(!cfg.playback_dir().join("rec_short.wav").exists());
        assert_eq!(orch.manifest().get("rec_short").unwrap().status, JobStatus::Skipped);
        assert!(!cfg.done_dir().join("rec_short.json.synced").exists());
    }

    #[test]
    fn s3_pending_then_labeled() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_wav(&cfg, "rec_pending");
        write_doc(
            &cfg,
            "rec_pending",
            r#"{
                "timestamp": "2026-03-01T09:00:00Z",
                "pipeline_status": "complete",
                "speaker_identification": {"identified": {}, "unidentified": ["SPEAKER_01"]},
                "segments": [{"start": 0.0, "end": 20.0, "text": "hi", "speaker": "SPEAKER_01", "speaker_name": null}],
                "assemblyai": {"audio_duration": 20.0, "status": "completed"}
            }"#,
        );

        let mut orch = Orchestrator::new(cfg.clone());
        orch.scan_once().unwrap();

        assert!(cfg.playback_dir().join("rec_pending.wav").exists());
        assert_eq!(
            orch.manifest().get("rec_pending").unwrap().status,
            JobStatus::PendingCurator
        );
        assert!(!cfg.done_dir().join("rec_pending.json.synced").exists());

        // Simulate the label action clearing `unidentified`.
        write_doc(
            &cfg,
            "rec_pending",
            r#"{
                "timestamp": "2026-03-01T09:00:00Z",
                "pipeline_status": "complete",
                "speaker_identification": {"identified": {"SPEAKER_01": "amy"}, "unidentified": []},
                "segments": [{"start": 0.0, "end": 20.0, "text": "hi", "speaker": "SPEAKER_01", "speaker_name": "amy"}],
                "assemblyai": {"audio_duration": 20.0, "status": "completed"}
            }"#,
        );
        orch.scan_once().unwrap();

        assert_eq!(
            orch.manifest().get("rec_pending").unwrap().status,
            JobStatus::CuratorSynced
        );
        assert!(cfg.done_dir().join("rec_pending.json.synced").exists());
    }

    #[test]
    fn asr_error_deletes_long_audio_instead_of_playback() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_wav(&cfg, "rec_failed_long");
        write_doc(
            &cfg,
            "rec_failed_long",
            r#"{
                "timestamp": "2026-03-01T09:00:00Z",
                "pipeline_status": null,
                "speaker_identification": {"identified": {}, "unidentified": []},
                "segments": [],
                "assemblyai": {"audio_duration": 120.0, "status": "error"}
            }"#,
        );

        let mut orch = Orchestrator::new(cfg.clone());
        orch.scan_once().unwrap();

        assert!(!cfg.inbox_dir().join("rec_failed_long.wav").exists());
        assert!(!cfg.playback_dir().join("rec_failed_long.wav").exists());
        let entry = orch.manifest().get("rec_failed_long").unwrap();
        assert_eq!(entry.status, JobStatus::Failed);
        assert!(entry.error.is_some());
        assert!(entry.stages.transcribed.is_none());
    }

    #[test]
    fn idempotent_scan_produces_same_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(dir.path());
        write_wav(&cfg, "rec_1");
        write_doc(
            &cfg,
            "rec_1",
            r#"{
                "timestamp": "2026-03-01T09:00:00Z",
                "pipeline_status": "complete",
                "speaker_identification": {"identified": {}, "unidentified": []},
                "segments": [{"start": 0.0, "end": 42.0, "text": "hi", "speaker": "SPEAKER_00", "speaker_name": null}],
                "assemblyai": {"audio_duration": 42.0, "status": "completed"}
            }"#,
        );

        let mut orch = Orchestrator::new(cfg.clone());
        orch.scan_once().unwrap();
        let after_first: Vec<_> = {
            let m = orch.manifest();
            let mut v: Vec<_> = m.iter().map(|(k, e)| (k.clone(), e.status)).collect();
            v.sort_by(|a, b| a.0.cmp(&b.0));
            v
        };

        let mutated_again = orch.scan_once().unwrap();
        let after_second: Vec<_> = {
            let m = orch.manifest();
            let mut v: Vec<_> = m.iter().map(|(k, e)| (k.clone(), e.status)).collect();
            v.sort_by(|a, b| a.0.cmp(&b.0));
            v
        };

        assert_eq!(after_first, after_second);
        assert!(!mutated_again, "second scan with no external change should not mutate");
    }
}
