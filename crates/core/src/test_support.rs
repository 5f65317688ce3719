// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Test builders and fixtures shared across crates (enabled via `test-support`).

use crate::task::{TaskId, TaskKind, TaskMetadata, TaskName, TaskRecord, TaskState};

impl TaskRecord {
    /// Build a pending single-task record with sensible test defaults.
    pub fn fixture(name: &str) -> Self {
        Self {
            task_id: TaskId::new(),
            kind: TaskKind::Single,
            name: TaskName::new(name),
            state: TaskState::Pending,
            children: Vec::new(),
            metadata: TaskMetadata::new(),
        }
    }
}
