//! Runtime configuration: the §6.1 settings table. Every value is
//! overridable by environment variable with the spec's listed default,
//! following the pattern the pack actually implements
//! (`tjameswilliams-meeting-assistant/src/config.rs`) rather than the
//! teacher's own stub `Config::load`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "ogg", "flac"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub audio_root: PathBuf,
    pub curator_root: PathBuf,
    pub profile_root: PathBuf,
    pub state_root: PathBuf,
    pub watch_folder_path: PathBuf,

    pub poll_interval_sec: u64,
    pub watch_poll_interval_sec: u64,
    pub min_playback_duration_sec: f64,
    pub orphan_age_hours: u64,
    pub stable_checks: u32,
    pub stable_interval_sec: u64,
    pub transcode_timeout_sec: u64,

    pub embedding_service_url: String,
    pub transcode_bin: String,
}

/// Lower-priority defaults merged in from an optional TOML file before
/// environment variables are applied on top.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileOverrides {
    audio_root: Option<PathBuf>,
    curator_root: Option<PathBuf>,
    profile_root: Option<PathBuf>,
    state_root: Option<PathBuf>,
    watch_folder_path: Option<PathBuf>,
    poll_interval_sec: Option<u64>,
    watch_poll_interval_sec: Option<u64>,
    min_playback_duration_sec: Option<f64>,
    orphan_age_hours: Option<u64>,
    stable_checks: Option<u32>,
    stable_interval_sec: Option<u64>,
    transcode_timeout_sec: Option<u64>,
    embedding_service_url: Option<String>,
    transcode_bin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let state_root = directories::ProjectDirs::from("", "", "voxkeep")
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./voxkeep-state"));

        Self {
            audio_root: PathBuf::from("./audio"),
            curator_root: PathBuf::from("./curator"),
            profile_root: PathBuf::from("./profiles"),
            state_root,
            watch_folder_path: PathBuf::from("./watch-folder"),
            poll_interval_sec: 5,
            watch_poll_interval_sec: 30,
            min_playback_duration_sec: 10.0,
            orphan_age_hours: 24,
            stable_checks: 3,
            stable_interval_sec: 2,
            transcode_timeout_sec: 300,
            embedding_service_url: "http://127.0.0.1:8765".to_string(),
            transcode_bin: "ffmpeg".to_string(),
        }
    }
}

impl Config {
    /// Load configuration: start from defaults, merge a TOML file if one
    /// is given (by `config_path` or `VOXKEEP_CONFIG`), then let
    /// individual environment variables override any field.
    pub fn load(config_path: Option<&std::path::Path>) -> Result<Self> {
        let mut cfg = Self::default();

        let toml_path = config_path
            .map(|p| p.to_path_buf())
            .or_else(|| std::env::var("VOXKEEP_CONFIG").ok().map(PathBuf::from));
        if let Some(path) = toml_path {
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                let overrides: FileOverrides = toml::from_str(&content)?;
                cfg.apply_file_overrides(overrides);
            }
        }

        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_file_overrides(&mut self, o: FileOverrides) {
        macro_rules! take {
            ($field:ident) => {
                if let Some(v) = o.$field {
                    self.$field = v;
                }
            };
        }
        take!(audio_root);
        take!(curator_root);
        take!(profile_root);
        take!(state_root);
        take!(watch_folder_path);
        take!(poll_interval_sec);
        take!(watch_poll_interval_sec);
        take!(min_playback_duration_sec);
        take!(orphan_age_hours);
        take!(stable_checks);
        take!(stable_interval_sec);
        take!(transcode_timeout_sec);
        take!(embedding_service_url);
        take!(transcode_bin);
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("AUDIO_ROOT") {
            self.audio_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CURATOR_ROOT") {
            self.curator_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("PROFILE_ROOT") {
            self.profile_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("STATE_ROOT") {
            self.state_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("WATCH_FOLDER_PATH") {
            self.watch_folder_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("POLL_INTERVAL_SEC") {
            self.poll_interval_sec = v.parse().unwrap_or(self.poll_interval_sec).max(1);
        }
        if let Ok(v) = std::env::var("WATCH_POLL_INTERVAL_SEC") {
            self.watch_poll_interval_sec = v.parse().unwrap_or(self.watch_poll_interval_sec);
        }
        if let Ok(v) = std::env::var("MIN_PLAYBACK_DURATION_SEC") {
            self.min_playback_duration_sec =
                v.parse().unwrap_or(self.min_playback_duration_sec);
        }
        if let Ok(v) = std::env::var("ORPHAN_AGE_HOURS") {
            self.orphan_age_hours = v.parse().unwrap_or(self.orphan_age_hours);
        }
        if let Ok(v) = std::env::var("STABLE_CHECKS") {
            self.stable_checks = v.parse().unwrap_or(self.stable_checks);
        }
        if let Ok(v) = std::env::var("STABLE_INTERVAL_SEC") {
            self.stable_interval_sec = v.parse().unwrap_or(self.stable_interval_sec);
        }
        if let Ok(v) = std::env::var("TRANSCODE_TIMEOUT_SEC") {
            self.transcode_timeout_sec = v.parse().unwrap_or(self.transcode_timeout_sec);
        }
        if let Ok(v) = std::env::var("EMBEDDING_SERVICE_URL") {
            self.embedding_service_url = v;
        }
        if let Ok(v) = std::env::var("TRANSCODE_BIN") {
            self.transcode_bin = v;
        }
    }

    pub fn inbox_dir(&self) -> PathBuf {
        self.audio_root.join("inbox")
    }
    pub fn done_dir(&self) -> PathBuf {
        self.audio_root.join("done")
    }
    pub fn playback_dir(&self) -> PathBuf {
        self.audio_root.join("playback")
    }
    pub fn temp_dir(&self) -> PathBuf {
        self.audio_root.join("temp")
    }
    pub fn jobs_manifest_path(&self) -> PathBuf {
        self.audio_root.join("jobs.json")
    }
    pub fn curator_voice_dir(&self) -> PathBuf {
        self.curator_root.join("voice")
    }
    pub fn curator_pending_dir(&self) -> PathBuf {
        self.curator_root.join("voice").join("_pending")
    }
    pub fn profiles_dir(&self) -> PathBuf {
        self.profile_root.join("profiles")
    }
    pub fn candidates_dir(&self) -> PathBuf {
        self.profile_root.join("candidates")
    }
    pub fn watch_state_path(&self) -> PathBuf {
        self.state_root.join("watch-folder-state.json")
    }
    pub fn watch_current_path(&self) -> PathBuf {
        self.state_root.join("watch-folder-current.json")
    }
    pub fn processed_audio_log_path(&self) -> PathBuf {
        self.state_root.join("processed_audio_log.json")
    }
}
