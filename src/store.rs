use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use crate::ConfigHistory;
use crate::consts::{CONFIG_INDENT, DEFAULT_CONFIG_PATH};

/// Loads and saves the fiscal year history.
///
/// Implementations assume a single writer; nothing guards the
/// load-modify-save sequence against concurrent processes.
pub trait ConfigStore {
    /// # Errors
    /// Returns `StoreError` if the history cannot be read or is malformed.
    fn load(&self) -> Result<ConfigHistory, StoreError>;

    /// # Errors
    /// Returns `StoreError` if the history cannot be written.
    fn save(&mut self, history: &ConfigHistory) -> Result<(), StoreError>;
}

/// Error type for history persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The history document could not be read.
    #[error("Failed to read fiscal year history from {}", .path.display())]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    /// The history document could not be written.
    #[error("Failed to write fiscal year history to {}", .path.display())]
    Write {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    /// The history document is not valid JSON or fails validation.
    #[error("Malformed fiscal year history: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keeps the history as a pretty-printed JSON list in a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Result<ConfigHistory, StoreError> {
        let text = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let history: ConfigHistory = serde_json::from_str(&text)?;
        debug!(path = %self.path.display(), records = history.len(), "loaded fiscal year history");
        Ok(history)
    }

    fn save(&mut self, history: &ConfigHistory) -> Result<(), StoreError> {
        let write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(CONFIG_INDENT));
        history.serialize(&mut serializer)?;

        fs::write(&self.path, buf).map_err(write_error)?;
        debug!(path = %self.path.display(), records = history.len(), "saved fiscal year history");
        Ok(())
    }
}

/// Keeps the history in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    history: ConfigHistory,
    saves:   usize,
}

impl MemoryStore {
    pub const fn new(history: ConfigHistory) -> Self {
        Self { history, saves: 0 }
    }

    /// Number of successful saves so far
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<ConfigHistory, StoreError> {
        Ok(self.history.clone())
    }

    fn save(&mut self, history: &ConfigHistory) -> Result<(), StoreError> {
        self.history = history.clone();
        self.saves += 1;
        Ok(())
    }
}
