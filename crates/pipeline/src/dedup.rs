// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Deduplication index (§4.3 stage 4): a set of known `chunk_id`s kept
//! alongside the vector store. Authoritative; the vector store's own
//! existence check is only consulted as a fallback when this index misses
//! (see [`crate::run::run_ingest`]).

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// A JSON-file-backed set of `chunk_id`s already stored for one database.
/// Not safe for concurrent writers to the same path; the worker pool
/// processes one job per file at a time and jobs for distinct databases use
/// distinct index files.
pub struct DedupIndex {
    path: PathBuf,
    known: BTreeSet<String>,
    dirty: bool,
}

impl DedupIndex {
    /// Load the index at `path`, treating a missing file as empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let path = path.into();
        let known = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, known, dirty: false })
    }

    pub fn contains(&self, chunk_id: &str) -> bool {
        self.known.contains(chunk_id)
    }

    /// Record `chunk_id` as now known. Callers must still call [`Self::flush`]
    /// to persist.
    pub fn insert(&mut self, chunk_id: String) {
        if self.known.insert(chunk_id) {
            self.dirty = true;
        }
    }

    pub fn flush(&mut self) -> Result<(), PipelineError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = Path::new(&self.path).parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec(&self.known)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &self.path)?;
        self.dirty = false;
        Ok(())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_index_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let index = DedupIndex::load(dir.path().join("dedup.json")).unwrap();
        assert!(!index.contains("abc"));
    }

    #[test]
    fn insert_then_flush_then_reload_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dedup.json");
        let mut index = DedupIndex::load(&path).unwrap();
        index.insert("chunk-1".to_string());
        index.flush().unwrap();

        let reloaded = DedupIndex::load(&path).unwrap();
        assert!(reloaded.contains("chunk-1"));
        assert!(!reloaded.contains("chunk-2"));
    }

    #[test]
    fn flush_without_changes_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dedup.json");
        let mut index = DedupIndex::load(&path).unwrap();
        index.flush().unwrap();
        assert!(!path.exists());
    }
}
