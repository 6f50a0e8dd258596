//! Persistence for run state between sessions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{error::SaveError, run::RunState};

pub const SAVE_VERSION: u32 = 1;

pub trait SaveStore {
    fn save(&mut self, state: &RunState) -> Result<(), SaveError>;

    /// Missing or unreadable saves come back as `None`; the caller starts a
    /// fresh run.
    fn load(&self) -> Option<RunState>;
}

/// On-disk wrapper around the run state.
#[derive(Debug, Serialize, Deserialize)]
struct SaveEnvelope {
    version: u32,
    saved_at: DateTime<Utc>,
    state: RunState,
}

fn encode(state: &RunState) -> Result<String, SaveError> {
    let envelope = SaveEnvelope {
        version: SAVE_VERSION,
        saved_at: Utc::now(),
        state: state.clone(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

fn decode(text: &str) -> Result<RunState, SaveError> {
    let envelope: SaveEnvelope = serde_json::from_str(text)?;
    if envelope.version != SAVE_VERSION {
        return Err(SaveError::UnsupportedVersion {
            found: envelope.version,
            expected: SAVE_VERSION,
        });
    }
    debug!("decoded save written at {}", envelope.saved_at);
    Ok(envelope.state)
}

/// Stores the run as pretty-printed JSON in a single file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like `load`, but reports why nothing came back.
    pub fn try_load(&self) -> Result<Option<RunState>, SaveError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        decode(&text).map(Some)
    }
}

impl SaveStore for JsonFileStore {
    fn save(&mut self, state: &RunState) -> Result<(), SaveError> {
        let text = encode(state)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, text)?;
        fs::rename(&temp_path, &self.path)?;
        info!("saved run to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Option<RunState> {
        match self.try_load() {
            Ok(state) => state,
            Err(err) => {
                warn!("ignoring save at {}: {err}", self.path.display());
                None
            }
        }
    }
}

/// Keeps the encoded save in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Option<String>,
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStore for MemoryStore {
    fn save(&mut self, state: &RunState) -> Result<(), SaveError> {
        self.slot = Some(encode(state)?);
        self.writes += 1;
        Ok(())
    }

    fn load(&self) -> Option<RunState> {
        let text = self.slot.as_deref()?;
        decode(text)
            .map_err(|err| warn!("ignoring in-memory save: {err}"))
            .ok()
    }
}
