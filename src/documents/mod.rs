//! The schedule and helper-state documents, and their shared-directory home.
//!
//! Two processes meet in one directory: the application writes the schedule
//! document (desired state), the helper reads it and owns the state document
//! (what it last told the OS). Every write is a whole-file replace; there is
//! no locking protocol between writer and reader, so readers must treat
//! "missing", "stale", and "unparseable" as ordinary states.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::WakeKind;

/// File name of the schedule document inside the shared directory.
const SCHEDULE_FILE: &str = "schedule.json";
/// File name of the helper state document.
const STATE_FILE: &str = "state.json";
/// File name of the helper's append-only log.
const LOG_FILE: &str = "helper.log";

/// Errors that can occur reading or writing the documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A document exists but is not valid JSON for its type.
    #[error("invalid document format: {0}")]
    Format(#[from] serde_json::Error),
}

/// Desired-state document written by the application.
///
/// If `enabled` is true and `next_wake` is present, that is the authoritative
/// single wake request; otherwise no wake should be outstanding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDocument {
    /// Whether any wake should be scheduled at all.
    pub enabled: bool,
    /// The moment the OS should wake the machine, local-naive.
    #[serde(default)]
    pub next_wake: Option<String>,
    /// Display time of the underlying alarm (`HH:MM`), logging only.
    #[serde(default)]
    pub alarm_time: Option<String>,
    /// Alarm label, logging only.
    #[serde(default)]
    pub label: Option<String>,
}

impl ScheduleDocument {
    /// A document expressing "no wake wanted".
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            next_wake: None,
            alarm_time: None,
            label: None,
        }
    }
}

/// Record of the wake request the helper believes is currently outstanding.
///
/// Owned exclusively by the helper; at all times the pair
/// (`last_scheduled_type`, `last_scheduled_wake`) names at most one
/// outstanding OS wake request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperState {
    /// Facility-formatted datetime of the most recent successfully scheduled
    /// wake, or `None` if none is outstanding.
    #[serde(default)]
    pub last_scheduled_wake: Option<String>,
    /// The wake-request category used for it.
    #[serde(default)]
    pub last_scheduled_type: Option<String>,
}

impl HelperState {
    /// The outstanding wake this state names, if both fields are present.
    pub fn outstanding(&self) -> Option<(WakeKind, &str)> {
        match (&self.last_scheduled_type, &self.last_scheduled_wake) {
            (Some(kind), Some(wake)) => Some((WakeKind::new(kind.clone()), wake.as_str())),
            _ => None,
        }
    }

    /// Record a successfully scheduled wake.
    pub fn record(&mut self, kind: &WakeKind, facility_datetime: impl Into<String>) {
        self.last_scheduled_type = Some(kind.as_str().to_string());
        self.last_scheduled_wake = Some(facility_datetime.into());
    }

    /// Forget any outstanding wake.
    pub fn clear(&mut self) {
        self.last_scheduled_wake = None;
        self.last_scheduled_type = None;
    }
}

/// The shared directory holding the schedule document, state document, and
/// log file.
#[derive(Debug, Clone)]
pub struct SharedDir {
    root: PathBuf,
}

impl SharedDir {
    /// Directory used when no configuration overrides it.
    pub const DEFAULT_PATH: &'static str = "/Users/Shared/Reveil";

    /// Create a handle for the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the schedule document.
    pub fn schedule_path(&self) -> PathBuf {
        self.root.join(SCHEDULE_FILE)
    }

    /// Path of the helper state document.
    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    /// Path of the helper log file.
    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }

    /// Ensure the directory exists. Returns `true` if it was newly created.
    ///
    /// A newly created directory is made world-writable so the unprivileged
    /// application process can write the schedule document into it. This is
    /// the accepted local-trust boundary of the design; do not tighten it.
    pub fn ensure_exists(&self) -> Result<bool, DocumentError> {
        if self.root.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&self.root)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.root, fs::Permissions::from_mode(0o777))?;
        }
        Ok(true)
    }

    /// Load the schedule document.
    ///
    /// Returns `Ok(None)` when the file does not exist; a present but
    /// unparseable file is a [`DocumentError::Format`] error.
    pub fn load_schedule(&self) -> Result<Option<ScheduleDocument>, DocumentError> {
        let path = self.schedule_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let document = serde_json::from_str(&contents)?;
        Ok(Some(document))
    }

    /// Write the schedule document by whole-file replace.
    pub fn save_schedule(&self, document: &ScheduleDocument) -> Result<(), DocumentError> {
        self.replace_file(&self.schedule_path(), document)
    }

    /// Load the helper state document.
    ///
    /// An absent or unparseable file yields the empty state: the helper then
    /// knows of no outstanding wake, which is the conservative reading.
    pub fn load_state(&self) -> HelperState {
        let contents = match fs::read_to_string(self.state_path()) {
            Ok(contents) => contents,
            Err(_) => return HelperState::default(),
        };
        serde_json::from_str(&contents).unwrap_or_default()
    }

    /// Persist the helper state document by whole-file replace.
    pub fn save_state(&self, state: &HelperState) -> Result<(), DocumentError> {
        self.replace_file(&self.state_path(), state)
    }

    /// Serialize `value` and replace `path` with it atomically: write a
    /// sibling temp file, then rename over the target. A concurrently
    /// starting reader sees either the old document or the new one, never a
    /// partial write.
    fn replace_file<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), DocumentError> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
