//! Curator Writer (C7, spec §4.7): serializes a transcript into the
//! curator's canonical, date-partitioned JSON format, handling the
//! pending-tree re-sync and name-collision rules.
//!
//! Date-partitioned directory convention grounded on
//! `rmorse-voicetestrs/src/core/notes.rs`'s `Note::save()`
//! (`base/YYYY/YYYY-MM-DD/...`), generalized to this spec's
//! `<curator-root>/voice/<YYYY>/<MM>/<DD>/...` layout.

use crate::config::Config;
use crate::error::CuratorWriterError;
use crate::model::TranscriptDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One grouped speaker with their utterances, in curator output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorSpeaker {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub utterances: Vec<CuratorUtteranceBrief>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorUtteranceBrief {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// A flat utterance entry labeled by the resolved display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorUtterance {
    pub speaker: String,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// The curator's canonical transcript document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratorDocument {
    pub timestamp: String,
    pub audio_path: String,
    pub duration: i64,
    pub num_speakers: usize,
    pub full_text: String,
    pub speakers: Vec<CuratorSpeaker>,
    pub utterances: Vec<CuratorUtterance>,
}

pub struct WriteOutcome {
    pub path: PathBuf,
}

pub struct CuratorWriter;

impl CuratorWriter {
    /// Transform a `TranscriptDocument` into the curator's canonical
    /// document, independent of where it ends up being written. Exposed
    /// separately so the roundtrip testable property can exercise the
    /// transformation without touching the filesystem.
    pub fn transform(stem: &str, doc: &TranscriptDocument) -> CuratorDocument {
        let full_text = doc
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let duration = doc
            .segments
            .iter()
            .map(|s| s.end)
            .fold(0.0_f64, f64::max)
            .round() as i64;

        // Group by segment.speaker preserving first-seen order, with the
        // first non-null speaker_name propagated as the group's name.
        let mut order: Vec<String> = Vec::new();
        let mut groups: BTreeMap<String, (Option<String>, Vec<CuratorUtteranceBrief>)> =
            BTreeMap::new();
        for seg in &doc.segments {
            let entry = groups
                .entry(seg.speaker.clone())
                .or_insert_with(|| {
                    order.push(seg.speaker.clone());
                    (None, Vec::new())
                });
            if entry.0.is_none() {
                entry.0 = seg.speaker_name.clone();
            }
            entry.1.push(CuratorUtteranceBrief {
                text: seg.text.clone(),
                start: seg.start,
                end: seg.end,
            });
        }

        let speakers: Vec<CuratorSpeaker> = order
            .iter()
            .map(|id| {
                let (name, utterances) = groups.remove(id).unwrap();
                CuratorSpeaker {
                    id: id.clone(),
                    name,
                    utterances,
                }
            })
            .collect();

        let utterances: Vec<CuratorUtterance> = doc
            .segments
            .iter()
            .map(|seg| CuratorUtterance {
                speaker: seg.speaker_name.clone().unwrap_or_else(|| seg.speaker.clone()),
                text: seg.text.clone(),
                start: seg.start,
                end: seg.end,
            })
            .collect();

        CuratorDocument {
            timestamp: doc.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            audio_path: stem.to_string(),
            duration,
            num_speakers: speakers.len(),
            full_text,
            speakers,
            utterances,
        }
    }

    /// Write the curator document for `stem`, honoring the re-sync and
    /// collision rules, and create the sync marker on success.
    pub fn write(
        cfg: &Config,
        stem: &str,
        doc: &TranscriptDocument,
    ) -> Result<WriteOutcome, CuratorWriterError> {
        let curator_doc = Self::transform(stem, doc);
        let date = doc.timestamp.date_naive();
        let active_dir = cfg
            .curator_voice_dir()
            .join(date.format("%Y").to_string())
            .join(date.format("%m").to_string())
            .join(date.format("%d").to_string());
        let pending_dir = cfg
            .curator_pending_dir()
            .join(date.format("%Y").to_string())
            .join(date.format("%m").to_string())
            .join(date.format("%d").to_string());

        fs::create_dir_all(&active_dir).map_err(|e| CuratorWriterError::CreateDir {
            path: active_dir.display().to_string(),
            source: e,
        })?;

        let target_path = if let Some(existing) = find_by_audio_path(&active_dir, stem) {
            existing
        } else if let Some(pending_path) = find_by_audio_path(&pending_dir, stem) {
            let filename = pending_path.file_name().unwrap();
            let moved_to = active_dir.join(filename);
            fs::rename(&pending_path, &moved_to).map_err(|e| CuratorWriterError::Write {
                path: moved_to.display().to_string(),
                source: e,
            })?;
            debug!("re-synced {} from pending to active", moved_to.display());
            moved_to
        } else {
            allocate_filename(&active_dir, &date.format("%H-%M-%S").to_string(), doc)?
        };

        let json = serde_json::to_string_pretty(&curator_doc).map_err(|e| {
            CuratorWriterError::Write {
                path: target_path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            }
        })?;
        fs::write(&target_path, &json).map_err(|e| CuratorWriterError::Write {
            path: target_path.display().to_string(),
            source: e,
        })?;

        let marker_path = cfg.done_dir().join(format!("{stem}.json.synced"));
        fs::write(&marker_path, b"").map_err(|e| CuratorWriterError::Marker {
            path: marker_path.display().to_string(),
            source: e,
        })?;

        Ok(WriteOutcome { path: target_path })
    }
}

/// Search a date directory for an existing curator file whose
/// `audio_path` equals `stem` - the re-sync match rule.
fn find_by_audio_path(dir: &Path, stem: &str) -> Option<PathBuf> {
    let read_dir = fs::read_dir(dir).ok()?;
    for entry in read_dir.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            if let Ok(existing) = serde_json::from_str::<CuratorDocument>(&content) {
                if existing.audio_path == stem {
                    return Some(path);
                }
            }
        }
    }
    None
}

/// Allocate `<HH-MM-SS>[-diarized][-N].json`, appending `-<N>` with the
/// smallest `N >= 1` that yields a free name not already used by a
/// different audio source.
fn allocate_filename(
    dir: &Path,
    time_part: &str,
    doc: &TranscriptDocument,
) -> Result<PathBuf, CuratorWriterError> {
    let diarized_suffix = if doc.diarization.as_ref().is_some_and(|v| !v.is_null()) {
        "-diarized"
    } else {
        ""
    };
    let base = format!("{time_part}{diarized_suffix}");

    let candidate = dir.join(format!("{base}.json"));
    if !candidate.exists() {
        return Ok(candidate);
    }

    for n in 1..1000u32 {
        let candidate = dir.join(format!("{base}-{n}.json"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(CuratorWriterError::NoFreeName { attempts: 1000 })
}
