//! Flat-file persistence for layouts, rules and single-window positions.
//!
//! Each collection lives in its own pretty-printed JSON array under the data
//! directory.  Reads never fail: a missing or corrupt file yields an empty
//! collection.  Writes do fail, and the error goes back to whoever asked for
//! the save.

use crate::model::{WindowLayout, WindowPosition, WindowRule};
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub const LAYOUTS_FILE: &str = "layouts.json";
pub const RULES_FILE: &str = "window_rules.json";
pub const POSITIONS_FILE: &str = "positions.json";

/// Error from writing a collection to disk.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A JSON array of `T` stored at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

pub type LayoutStore = JsonStore<WindowLayout>;
pub type RuleStore = JsonStore<WindowRule>;

impl<T: Serialize + DeserializeOwned> JsonStore<T> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection, or an empty one if the file is missing or
    /// unreadable.
    pub fn load(&self) -> Vec<T> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, starting empty", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                error!("failed to read {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<T>>(&contents) {
            Ok(items) => {
                info!("loaded {} entries from {}", items.len(), self.path.display());
                items
            }
            Err(e) => {
                error!("failed to parse {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Write the collection, creating the parent directory if needed.
    pub fn save(&self, items: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(items).map_err(|source| StoreError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!("saved {} entries to {}", items.len(), self.path.display());
        Ok(())
    }
}

/// Legacy one-placement-per-process store (`positions.json`).
#[derive(Debug, Clone)]
pub struct PositionStore {
    inner: JsonStore<WindowPosition>,
}

impl PositionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: JsonStore::new(path),
        }
    }

    pub fn load(&self) -> Vec<WindowPosition> {
        self.inner.load()
    }

    /// Replace any entry with the same process name, then append.
    pub fn upsert(&self, position: WindowPosition) -> Result<(), StoreError> {
        let mut positions = self.inner.load();
        positions.retain(|p| p.process_name != position.process_name);
        positions.push(position);
        self.inner.save(&positions)
    }

    pub fn find(&self, process_name: &str) -> Option<WindowPosition> {
        self.inner
            .load()
            .into_iter()
            .find(|p| p.process_name == process_name)
    }
}

/// The three stores rooted at one data directory.
#[derive(Debug, Clone)]
pub struct Stores {
    pub layouts: LayoutStore,
    pub rules: RuleStore,
    pub positions: PositionStore,
}

impl Stores {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            layouts: JsonStore::new(dir.join(LAYOUTS_FILE)),
            rules: JsonStore::new(dir.join(RULES_FILE)),
            positions: PositionStore::new(dir.join(POSITIONS_FILE)),
        }
    }
}

//  Tests
