// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Cooperative cancellation: a handler checks this flag at safe points
//! (between chunks, between extractors). There is no hard kill (§4.2).

use std::sync::Arc;

use lf_core::TaskId;
use lf_storage::ResultStore;

/// A cheap, repeatedly-pollable view of one task's revocation status.
/// Handlers are expected to check this at chunk/extractor boundaries, not
/// on every loop iteration — each check is a Result Store read.
#[derive(Clone)]
pub struct RevocationFlag {
    store: Arc<ResultStore>,
    task_id: TaskId,
}

impl RevocationFlag {
    pub fn new(store: Arc<ResultStore>, task_id: TaskId) -> Self {
        Self { store, task_id }
    }

    /// Whether the task has been revoked since the handler started.
    pub fn is_revoked(&self) -> bool {
        use lf_core::TaskStateKind;
        self.store
            .get(&self.task_id)
            .map(|record| record.state.kind() == TaskStateKind::Revoked)
            .unwrap_or(false)
    }

    /// The Result Store backing this flag, so a handler can report progress
    /// on the same task without the broker threading it through separately.
    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_core::{TaskMetadata, TaskName};
    use tempfile::TempDir;

    #[test]
    fn reflects_revocation_written_after_construction() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ResultStore::create(dir.path()).unwrap());
        let task_id = TaskId::new();
        store.put_pending(task_id.clone(), TaskName::new("rag.ingest_file"), TaskMetadata::new()).unwrap();
        store.set_started(&task_id).unwrap();

        let flag = RevocationFlag::new(store.clone(), task_id.clone());
        assert!(!flag.is_revoked());

        store.revoke(&task_id).unwrap();
        assert!(flag.is_revoked());
    }
}
