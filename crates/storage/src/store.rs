// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! The Result Store: one JSON file per Task Record, written atomically.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use lf_core::{TaskId, TaskMetadata, TaskName, TaskRecord, TaskState, TaskStateKind};

use crate::error::StoreError;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A durable, cross-process key->record map for Task Records.
///
/// Each record lives at `root/<task_id>`. Writes go to a uniquely-named
/// temp file in the same directory and are renamed into place, so a reader
/// never observes a half-written record.
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    /// Open an existing store directory. Fails with [`StoreError::StoreMissing`]
    /// if `root` does not exist or is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::StoreMissing(root));
        }
        Ok(Self { root })
    }

    /// Open a store directory, creating it (and its parents) if missing.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, task_id: &TaskId) -> PathBuf {
        self.root.join(task_id.as_str())
    }

    /// Side-effect-free read. Missing or corrupt (truncated/unparseable)
    /// records are both reported as [`StoreError::NotFound`]; corruption is
    /// logged rather than propagated as a parse error.
    pub fn get(&self, task_id: &TaskId) -> Result<TaskRecord, StoreError> {
        self.read_record(task_id)
    }

    fn read_record(&self, task_id: &TaskId) -> Result<TaskRecord, StoreError> {
        let path = self.record_path(task_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(task_id.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<TaskRecord>(&bytes) {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "corrupt task record, reporting as not found");
                Err(StoreError::NotFound(task_id.clone()))
            }
        }
    }

    fn write_record_atomic(&self, record: &TaskRecord) -> Result<(), StoreError> {
        let final_path = self.record_path(&record.task_id);
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_path =
            self.root.join(format!(".{}.{}.{}.tmp", record.task_id.as_str(), std::process::id(), n));
        let bytes = serde_json::to_vec(record).expect("TaskRecord serialization is infallible");
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    /// Write a PENDING record. Fails with [`StoreError::AlreadyExists`] if
    /// `task_id` is already present.
    pub fn put_pending(
        &self,
        task_id: TaskId,
        name: TaskName,
        metadata: TaskMetadata,
    ) -> Result<(), StoreError> {
        if self.record_path(&task_id).exists() {
            return Err(StoreError::AlreadyExists(task_id));
        }
        let record = TaskRecord::new_pending(task_id, name, metadata);
        self.write_record_atomic(&record)
    }

    /// Write a PENDING group record whose `children` list names every child
    /// `task_id`. Fails with [`StoreError::AlreadyExists`] if `task_id` is
    /// already present.
    pub fn put_group_pending(
        &self,
        task_id: TaskId,
        name: TaskName,
        children: Vec<TaskId>,
        metadata: TaskMetadata,
    ) -> Result<(), StoreError> {
        if self.record_path(&task_id).exists() {
            return Err(StoreError::AlreadyExists(task_id));
        }
        let record = TaskRecord::new_group_pending(task_id, name, children, metadata);
        self.write_record_atomic(&record)
    }

    /// PENDING -> STARTED. Idempotent. Fails with [`StoreError::BadTransition`]
    /// if the current state is terminal (other than an earlier REVOKE, which
    /// always wins and is silently preserved).
    pub fn set_started(&self, task_id: &TaskId) -> Result<(), StoreError> {
        self.transition(task_id, TaskState::Started)
    }

    /// non-terminal -> SUCCESS. Idempotent on retry with an identical result.
    pub fn set_success(&self, task_id: &TaskId, result: serde_json::Value) -> Result<(), StoreError> {
        self.transition(task_id, TaskState::Success { result })
    }

    /// non-terminal -> FAILURE. Idempotent on retry with an identical traceback.
    pub fn set_failure(&self, task_id: &TaskId, traceback: String) -> Result<(), StoreError> {
        self.transition(task_id, TaskState::Failure { traceback })
    }

    /// non-terminal -> REVOKED.
    pub fn revoke(&self, task_id: &TaskId) -> Result<(), StoreError> {
        self.transition(task_id, TaskState::Revoked)
    }

    /// Merge progress metadata into an in-flight record's `metadata` map,
    /// without touching `state`. Used by the ingestion pipeline to surface
    /// `{progress, message, current_file, stage}` while a job runs.
    pub fn merge_metadata(
        &self,
        task_id: &TaskId,
        updates: TaskMetadata,
    ) -> Result<(), StoreError> {
        let mut record = self.read_record(task_id)?;
        record.metadata.extend(updates);
        self.write_record_atomic(&record)
    }

    fn transition(&self, task_id: &TaskId, next: TaskState) -> Result<(), StoreError> {
        let mut record = self.read_record(task_id)?;

        // A revoke always wins: once REVOKED, every later transition attempt
        // is a silent no-op rather than an error (§8 round-trip property).
        if record.state.kind() == TaskStateKind::Revoked {
            return Ok(());
        }
        // Re-applying the exact same state (terminal or not) is a no-op.
        if record.state == next {
            return Ok(());
        }
        if !record.state.can_transition_to(&next) {
            return Err(StoreError::BadTransition {
                task_id: task_id.clone(),
                from: record.state.kind(),
                to: next.kind(),
            });
        }
        record.state = next;
        self.write_record_atomic(&record)
    }
}
