use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{GhxError, Result};
use crate::types::EntityKind;

const INDEX_FILE: &str = "index.json";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub position: usize,
    pub url: String,
    /// Stored by name; an index written by a newer ghx may name kinds this one lacks.
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    entries: Vec<IndexEntry>,
}

/// The numbered reference left behind by the most recent listing.
///
/// Each listing replaces the whole file; a later `view N` reads it back.
/// Writes go to a temp file in the same directory and are renamed into
/// place, so readers see either the old index or the new one, never a mix.
/// Two listings racing is fine: the last rename wins.
#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
}

impl IndexCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// XDG-compatible location: ~/.cache/ghx/index.json (Linux) or ~/Library/Caches/ghx/ (macOS)
    pub fn default_location() -> Result<Self> {
        let dir = dirs::cache_dir()
            .ok_or_else(|| GhxError::Config("no cache directory for this platform".to_string()))?
            .join("ghx");
        Ok(Self::new(dir.join(INDEX_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the index; positions are 1-based in sequence order.
    pub fn replace(&self, entries: &[(String, EntityKind)]) -> Result<()> {
        let file = IndexFile {
            version: FORMAT_VERSION,
            entries: entries
                .iter()
                .enumerate()
                .map(|(i, (url, kind))| IndexEntry {
                    position: i + 1,
                    url: url.clone(),
                    kind: kind.as_str().to_string(),
                })
                .collect(),
        };

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, &file)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| GhxError::Io(e.error))?;

        tracing::debug!(path = %self.path.display(), count = entries.len(), "index replaced");
        Ok(())
    }

    pub fn resolve(&self, position: usize) -> Result<(String, EntityKind)> {
        let entries = self.load()?.ok_or(GhxError::EmptyCache)?;
        let len = entries.len();
        let entry = position
            .checked_sub(1)
            .and_then(|i| entries.into_iter().nth(i))
            .ok_or(GhxError::PositionNotFound { position, len })?;
        let kind: EntityKind = entry.kind.parse()?;
        Ok((entry.url, kind))
    }

    /// Number of entries in the current index, 0 if none was ever written.
    #[cfg(test)]
    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.map(|entries| entries.len()).unwrap_or(0))
    }

    /// Removes the index. Clearing an index that does not exist is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "index cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self) -> Result<Option<Vec<IndexEntry>>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: IndexFile =
            serde_json::from_str(&data).map_err(|e| GhxError::CorruptCache(e.to_string()))?;
        if file.version != FORMAT_VERSION {
            return Err(GhxError::CorruptCache(format!(
                "unknown index version {}",
                file.version
            )));
        }
        Ok(Some(file.entries))
    }
}
