//! Key-value preference persistence.
//!
//! The theme mode survives restarts through a [`PreferenceStore`]. On disk each
//! key is one small file under `$XDG_STATE_HOME/stromme/`, kept apart from the
//! configuration directory. Writes go through a temporary file in the same
//! directory and are renamed into place, so a crash never leaves a torn value.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::NamedTempFile;

use crate::constants::STATE_DIR_NAME;
use crate::error::{Error, Result};

/// String-keyed preference storage.
#[cfg_attr(test, mockall::automock)]
pub trait PreferenceStore {
    /// Read the value stored under `key`, `None` if nothing was stored yet.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Default state directory: `$XDG_STATE_HOME/stromme`, or `~/.local/state/stromme`.
pub fn default_state_dir() -> PathBuf {
    let state_home = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });
    state_home.join(STATE_DIR_NAME)
}

/// One file per key in a state directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store files in `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the preference files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::persistence(
                key,
                io::Error::new(io::ErrorKind::InvalidInput, "invalid preference key"),
            ));
        }
        Ok(self.dir.join(key))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content.trim().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::persistence(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| Error::persistence(key, e))?;

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(|e| Error::persistence(key, e))?;
        writeln!(temp, "{value}").map_err(|e| Error::persistence(key, e))?;
        temp.persist(&path)
            .map_err(|e| Error::persistence(key, e.error))?;
        Ok(())
    }
}

/// In-memory store. Clones share the same map, so a test can keep one clone
/// to inspect what the controller wrote through the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
