// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Result Store error taxonomy.

use lf_core::{TaskId, TaskStateKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task `{0}` already exists")]
    AlreadyExists(TaskId),

    #[error("task `{task_id}` cannot transition from {from} to {to}")]
    BadTransition { task_id: TaskId, from: TaskStateKind, to: TaskStateKind },

    #[error("task `{0}` not found")]
    NotFound(TaskId),

    #[error("result store directory missing: {0}")]
    StoreMissing(std::path::PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
