//! Persistent content-hash index.
//!
//! The index maps content digests to the canonical path a file with that
//! content was stored at, plus a first-seen timestamp. It lives as a single
//! JSON file under the destination root and is the only persistent state
//! the organizer keeps.
//!
//! Loading is fail-soft: a missing or corrupt index must never block an
//! organizing pass, so it degrades to an empty index. Saving is a full
//! atomic rewrite (write to a temp sibling, then rename) so a crash or a
//! concurrent reader never observes a truncated file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the index file kept under the destination root.
pub const INDEX_FILENAME: &str = ".organizer_index.json";

/// A single recorded content observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Canonical destination path of the first file seen with this content.
    pub path: String,
    /// When the content was first recorded, RFC 3339 UTC.
    #[serde(rename = "firstSeen")]
    pub first_seen: String,
}

/// Errors that can occur while persisting the index.
#[derive(Debug)]
pub enum IndexError {
    /// The in-memory index could not be serialized to JSON.
    SerializeFailed { reason: String },
    /// The temp file could not be written.
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The temp file could not be renamed over the index file.
    RenameFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SerializeFailed { reason } => {
                write!(f, "Failed to serialize index: {}", reason)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "Failed to write index to {}: {}", path.display(), source)
            }
            Self::RenameFailed { path, source } => {
                write!(
                    f,
                    "Failed to replace index at {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for IndexError {}

/// In-memory view of the persisted digest index.
///
/// Entries are kept in a sorted map so the serialized file is stable across
/// runs and friendly to diffing.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    entries: BTreeMap<String, IndexEntry>,
}

impl HashIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the path of the index file for a destination root.
    pub fn index_path(destination: &Path) -> PathBuf {
        destination.join(INDEX_FILENAME)
    }

    /// Loads the index from disk.
    ///
    /// A missing, unreadable, or corrupt file yields an empty index; load
    /// never fails. Corruption means duplicate detection degrades to "not
    /// yet known" rather than blocking the pass.
    pub fn load(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::new();
        };
        match serde_json::from_str::<BTreeMap<String, IndexEntry>>(&contents) {
            Ok(entries) => Self { entries },
            Err(_) => Self::new(),
        }
    }

    /// Looks up the entry recorded for a content digest.
    pub fn lookup(&self, digest: &str) -> Option<&IndexEntry> {
        self.entries.get(digest)
    }

    /// Records (or overwrites) the destination for a content digest,
    /// stamping the current UTC time as first-seen.
    pub fn record(&mut self, digest: &str, destination: &Path) {
        self.entries.insert(
            digest.to_string(),
            IndexEntry {
                path: destination.to_string_lossy().to_string(),
                first_seen: chrono::Utc::now().to_rfc3339(),
            },
        );
    }

    /// Number of recorded digests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no digests are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Saves the full index atomically.
    ///
    /// The mapping is serialized as pretty JSON into a `.tmp` sibling of
    /// `path`, which is then renamed over the final file, so readers only
    /// ever see a complete index.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            IndexError::SerializeFailed {
                reason: e.to_string(),
            }
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| INDEX_FILENAME.to_string());
        let tmp_path = path.with_file_name(format!("{}.tmp", file_name));

        fs::write(&tmp_path, json).map_err(|e| IndexError::WriteFailed {
            path: tmp_path.clone(),
            source: e,
        })?;

        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            IndexError::RenameFailed {
                path: path.to_path_buf(),
                source: e,
            }
        })
    }
}
