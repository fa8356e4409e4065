//! Watch-Folder Ingester (C5, spec §4.4): brings externally-provided
//! audio files into `inbox/`, canonicalized, deduplicated by content
//! hash, and auditable via a monotone ledger.
//!
//! Directory-walk and extension-filter shape grounded on
//! `rmorse-voicetestrs/tauri/src-tauri/src/sync/imports.rs`'s
//! `ImportProcessor::scan_imports`; its own `notify`-based
//! `file_watcher.rs` was not used because the spec requires stability
//! detection by repeated size polling, not filesystem events. The
//! bounded transcoder timeout is grounded on
//! `process_manager.rs::wait_for_server`'s poll-with-deadline idiom,
//! adapted to a single bounded `tokio::time::timeout` around the
//! external process instead of a retry loop.

use crate::config::{Config, SUPPORTED_EXTENSIONS};
use crate::error::IngestError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Give up waiting for a file to stabilize after this many poll
/// attempts. Not spec-enumerated; chosen generously relative to
/// `STABLE_CHECKS` so a slow cloud sync isn't mistaken for a stuck one.
const MAX_STABILITY_ATTEMPTS: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchFolderState {
    pub active: bool,
}

impl Default for WatchFolderState {
    fn default() -> Self {
        Self { active: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentFileStatus {
    Idle,
    Downloading,
    Waiting,
    Converting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentFileState {
    pub current_file: Option<String>,
    pub status: CurrentFileStatus,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Default for CurrentFileState {
    fn default() -> Self {
        Self {
            current_file: None,
            status: CurrentFileStatus::Idle,
            updated_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub hash: String,
    pub processed_at: chrono::DateTime<chrono::Utc>,
    pub source_path: String,
    pub source_filename: String,
    pub inbox_filename: String,
}

pub type Ledger = HashMap<String, LedgerEntry>;

pub struct WatchFolderIngester {
    cfg: Config,
}

impl WatchFolderIngester {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// Run the ingester's poll loop forever at `cfg.watch_poll_interval_sec`.
    pub async fn run_forever(self) {
        let interval = Duration::from_secs(self.cfg.watch_poll_interval_sec.max(1));
        loop {
            if let Err(e) = self.scan_once().await {
                error!("watch-folder scan cycle failed: {e}");
            }
            tokio::time::sleep(interval).await;
        }
    }

    pub fn set_active(&self, active: bool) -> Result<(), IngestError> {
        save_atomic(&self.cfg.watch_state_path(), &WatchFolderState { active })
            .map_err(IngestError::LedgerSave)
    }

    fn is_active(&self) -> bool {
        load_json(&self.cfg.watch_state_path()).unwrap_or_default().active
    }

    /// Run a single ingestion scan. Processes every eligible file in
    /// the watched directory in turn; per-file failures are logged and
    /// do not abort the scan.
    pub async fn scan_once(&self) -> Result<(), IngestError> {
        if !self.cfg.watch_folder_path.exists() {
            warn!("watched directory {} is missing", self.cfg.watch_folder_path.display());
            return Err(IngestError::WatchedDirMissing(
                self.cfg.watch_folder_path.display().to_string(),
            ));
        }

        fs::create_dir_all(self.cfg.temp_dir()).ok();
        fs::create_dir_all(self.cfg.inbox_dir()).ok();

        let mut ledger: Ledger = load_json(&self.cfg.processed_audio_log_path()).unwrap_or_default();

        let Ok(read_dir) = fs::read_dir(&self.cfg.watch_folder_path) else {
            return Ok(());
        };
        let mut candidates: Vec<PathBuf> = read_dir
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_supported_extension(p))
            .collect();
        candidates.sort();

        for source_path in candidates {
            if !self.is_active() {
                debug!("watch-folder ingestion paused; stopping scan");
                break;
            }

            let Some(basename) = source_path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            if ledger.contains_key(&basename) {
                continue;
            }

            match self.ingest_one(&source_path, &basename).await {
                Ok(Some(entry)) => {
                    ledger.insert(basename.clone(), entry);
                    if let Err(e) = save_atomic(&self.cfg.processed_audio_log_path(), &ledger) {
                        error!("failed to persist ledger after ingesting {basename}: {e}");
                    }
                }
                Ok(None) => {
                    // Deduplicated against an existing hash; no ledger entry added.
                }
                Err(e) => {
                    warn!("failed to ingest {basename}: {e}");
                }
            }
        }

        self.set_current_file(None, CurrentFileStatus::Idle);
        Ok(())
    }

    async fn ingest_one(
        &self,
        source_path: &Path,
        basename: &str,
    ) -> Result<Option<LedgerEntry>, IngestError> {
        self.set_current_file(Some(basename.to_string()), CurrentFileStatus::Downloading);

        let staging_path = self.cfg.temp_dir().join(basename);
        fs::copy(source_path, &staging_path).map_err(|e| IngestError::StagingCopy {
            source_path: source_path.display().to_string(),
            source: e,
        })?;

        self.set_current_file(Some(basename.to_string()), CurrentFileStatus::Waiting);
        self.wait_for_stability(&staging_path).await?;

        let hash = hash_file(&staging_path).map_err(|e| IngestError::Hash {
            path: staging_path.display().to_string(),
            source: e,
        })?;

        let existing_ledger: Ledger = load_json(&self.cfg.processed_audio_log_path()).unwrap_or_default();
        if existing_ledger.values().any(|e| e.hash == hash) {
            let _ = fs::remove_file(&staging_path);
            info!("deduplicated {basename} (hash already ingested)");
            return Ok(None);
        }

        self.set_current_file(Some(basename.to_string()), CurrentFileStatus::Converting);
        let inbox_filename = self.canonicalize(&staging_path, basename).await?;

        Ok(Some(LedgerEntry {
            hash,
            processed_at: chrono::Utc::now(),
            source_path: source_path.display().to_string(),
            source_filename: basename.to_string(),
            inbox_filename,
        }))
    }

    async fn wait_for_stability(&self, path: &Path) -> Result<(), IngestError> {
        let interval = Duration::from_secs(self.cfg.stable_interval_sec.max(1));
        let mut last_size: Option<u64> = None;
        let mut stable_observations = 0u32;

        for _attempt in 0..MAX_STABILITY_ATTEMPTS {
            let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            if size > 0 && Some(size) == last_size {
                stable_observations += 1;
                if stable_observations >= self.cfg.stable_checks {
                    return Ok(());
                }
            } else {
                stable_observations = 0;
            }
            last_size = Some(size);
            tokio::time::sleep(interval).await;
        }

        Err(IngestError::Instability {
            path: path.display().to_string(),
            attempts: MAX_STABILITY_ATTEMPTS,
        })
    }

    /// Rename `.wav` staging files straight into the inbox; transcode
    /// everything else with a bounded-timeout external process.
    async fn canonicalize(&self, staging_path: &Path, basename: &str) -> Result<String, IngestError> {
        let stem = Path::new(basename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(basename);
        let sanitized_stem = sanitize_stem(stem);
        let is_wav = staging_path.extension().and_then(|e| e.to_str()) == Some("wav");

        let final_wav_path = if is_wav {
            staging_path.to_path_buf()
        } else {
            let transcoded_path = staging_path.with_extension("transcoded.wav");
            self.transcode(staging_path, &transcoded_path).await?;
            let _ = fs::remove_file(staging_path);
            transcoded_path
        };

        let inbox_filename = allocate_inbox_filename(&self.cfg.inbox_dir(), &sanitized_stem);
        let inbox_path = self.cfg.inbox_dir().join(&inbox_filename);
        fs::rename(&final_wav_path, &inbox_path).map_err(|e| IngestError::Transcode {
            path: final_wav_path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(inbox_filename)
    }

    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), IngestError> {
        let timeout = Duration::from_secs(self.cfg.transcode_timeout_sec.max(1));
        let mut cmd = tokio::process::Command::new(&self.cfg.transcode_bin);
        cmd.args([
            "-y",
            "-i",
            &input.display().to_string(),
            "-ar",
            "16000",
            "-ac",
            "1",
            &output.display().to_string(),
        ]);
        cmd.stdout(std::process::Stdio::null());
        cmd.stderr(std::process::Stdio::null());

        let child = cmd.spawn().map_err(|e| IngestError::Transcode {
            path: input.display().to_string(),
            reason: e.to_string(),
        })?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output_result)) if output_result.status.success() => Ok(()),
            Ok(Ok(output_result)) => {
                let _ = fs::remove_file(input);
                Err(IngestError::Transcode {
                    path: input.display().to_string(),
                    reason: format!("transcoder exited with {}", output_result.status),
                })
            }
            Ok(Err(e)) => {
                let _ = fs::remove_file(input);
                Err(IngestError::Transcode {
                    path: input.display().to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                let _ = fs::remove_file(input);
                Err(IngestError::TranscodeTimeout {
                    path: input.display().to_string(),
                    timeout_sec: self.cfg.transcode_timeout_sec,
                })
            }
        }
    }

    fn set_current_file(&self, current_file: Option<String>, status: CurrentFileStatus) {
        let state = CurrentFileState {
            current_file,
            status,
            updated_at: chrono::Utc::now(),
        };
        if let Err(e) = save_atomic(&self.cfg.watch_current_path(), &state) {
            warn!("failed to persist current-file state: {e}");
        }
    }
}

fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lower-case, path-safe stem for the inbox filename (distinct from the
/// identity-name sanitizer - this one only needs to be filesystem-safe,
/// not a display name).
fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

fn allocate_inbox_filename(inbox_dir: &Path, sanitized_stem: &str) -> String {
    let base = format!("gdrive_{sanitized_stem}");
    let candidate = format!("{base}.wav");
    if !inbox_dir.join(&candidate).exists() {
        return candidate;
    }
    for n in 1..10_000u32 {
        let candidate = format!("{base}_{n}.wav");
        if !inbox_dir.join(&candidate).exists() {
            return candidate;
        }
    }
    format!("{base}_overflow.wav")
}

fn hash_file(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

fn load_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Option<T> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn save_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &json)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
