//! Save and load of a session to a JSON file.
//!
//! Loading fails open: a missing, unreadable or malformed file is "no save".

mod data;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

pub use data::{EventFlags, SaveData, SAVE_VERSION};

const SAVE_FILE_NAME: &str = ".rogsh_save.json";

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot encode save data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where sessions are persisted.
pub trait Persistence {
    fn save_exists(&self) -> bool;
    fn load(&self) -> Option<SaveData>;
    fn save(&self, data: &SaveData) -> Result<(), SaveError>;
}

#[derive(Debug, Clone)]
pub struct JsonSaveManager {
    path: PathBuf,
}

impl JsonSaveManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonSaveManager { path: path.into() }
    }

    /// `~/.rogsh_save.json`, falling back to the working directory.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(SAVE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(SAVE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonSaveManager {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl Persistence for JsonSaveManager {
    fn save_exists(&self) -> bool {
        self.load().is_some()
    }

    fn load(&self) -> Option<SaveData> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no save file");
                return None;
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cannot read save file");
                return None;
            }
        };
        let data: SaveData = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring malformed save file");
                return None;
            }
        };
        if !data.is_versioned() {
            warn!(path = %self.path.display(), "ignoring save file without version");
            return None;
        }
        info!(path = %self.path.display(), turn = data.game_state.turn_count, "save loaded");
        Some(data)
    }

    fn save(&self, data: &SaveData) -> Result<(), SaveError> {
        let json = serde_json::to_string_pretty(data)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SaveError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, json).map_err(|source| SaveError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "game saved");
        Ok(())
    }
}
