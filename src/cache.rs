//! Flat brain_id -> image prefix lookup file.
//!
//! The file is read whole and written whole; entries are never expired.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use indexmap::IndexMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CACHE_FILE: &str = "img_prefixes.json";

/// Per-user location for the lookup file, if the platform has one.
pub fn default_cache_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("org", "alleninstitute", "exaspim-datasets")?;
    Some(proj.data_dir().join(CACHE_FILE))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixCache {
    /// Kept in file order; new ids append.
    entries: IndexMap<String, String>,
}

impl PrefixCache {
    /// Read the whole file. A missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self> {
        // Missing file is the first-run case, anything else is a real failure
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "prefix cache missing, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::io(path, e)),
        };
        let entries: IndexMap<String, String> = serde_json::from_slice(&bytes)?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "prefix cache loaded");
        Ok(Self { entries })
    }

    /// Overwrite the file with the full mapping.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Fresh per-user data dirs may not exist yet
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let json = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(path, json).map_err(|e| Error::io(path, e))?;
        tracing::debug!(path = %path.display(), entries = self.entries.len(), "prefix cache written");
        Ok(())
    }

    pub fn get(&self, brain_id: &str) -> Option<&str> {
        self.entries.get(brain_id).map(String::as_str)
    }

    pub fn insert(&mut self, brain_id: impl Into<String>, prefix: impl Into<String>) {
        self.entries.insert(brain_id.into(), prefix.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }
}
