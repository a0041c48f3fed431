// Snapshot fetch sources
//
// The HTTP layer lives outside this crate. A source answers one key with one
// response; the context decides whether that response is still wanted.

use crate::snapshot::model::{SnapshotKey, SnapshotResponse};
use crate::snapshot::SnapshotError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub trait SnapshotSource {
    fn fetch(&self, key: &SnapshotKey) -> Result<SnapshotResponse, SnapshotError>;
}

/// Responses held in memory, keyed by request parameters
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotSource {
    responses: HashMap<SnapshotKey, SnapshotResponse>,
}

impl MemorySnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SnapshotKey, response: SnapshotResponse) {
        self.responses.insert(key, response);
    }
}

impl SnapshotSource for MemorySnapshotSource {
    fn fetch(&self, key: &SnapshotKey) -> Result<SnapshotResponse, SnapshotError> {
        self.responses
            .get(key)
            .cloned()
            .ok_or_else(|| SnapshotError::NotFound(key.path()))
    }
}

/// Responses stored as JSON files mirroring the endpoint path
///
/// `/experiment/exp_1/snapshot/0/browser` is read from
/// `<root>/experiment/exp_1/snapshot/0/browser.json`.
#[derive(Debug, Clone)]
pub struct DirectorySnapshotSource {
    root: PathBuf,
}

impl DirectorySnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the response for `key`
    ///
    /// Experiment ids and dimension names are single path segments; anything
    /// that could climb out of `root` is rejected.
    pub fn file_for(&self, key: &SnapshotKey) -> Result<PathBuf, SnapshotError> {
        check_segment(&key.experiment_id)?;
        if !key.dimension.is_empty() {
            check_segment(&key.dimension)?;
        }

        let relative = key.path();
        // Dimension names may contain dots, so append rather than set_extension
        let mut file = self.root.join(relative.trim_start_matches('/')).into_os_string();
        file.push(".json");
        Ok(PathBuf::from(file))
    }
}

fn check_segment(segment: &str) -> Result<(), SnapshotError> {
    let invalid = segment.is_empty()
        || segment == "."
        || segment.contains("..")
        || segment.contains(['/', '\\', '\0']);
    if invalid {
        tracing::warn!(segment, "rejecting snapshot path segment");
        return Err(SnapshotError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

impl SnapshotSource for DirectorySnapshotSource {
    fn fetch(&self, key: &SnapshotKey) -> Result<SnapshotResponse, SnapshotError> {
        let path = self.file_for(key)?;
        tracing::debug!(path = %path.display(), "reading snapshot");

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SnapshotError::NotFound(key.path()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&contents)?)
    }
}
