// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Opaque handles returned by dispatch, and the polled-record view the
//! producer side reads back.

use lf_core::{TaskId, TaskKind, TaskMetadata, TaskName, TaskState};

/// Returned by [`crate::Broker::dispatch`]. Callers hold only the `task_id`;
/// the Task Record itself is exclusively owned by the Result Store (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub task_id: TaskId,
}

/// Returned by [`crate::Broker::dispatch_group`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupHandle {
    pub task_id: TaskId,
    pub children: Vec<TaskId>,
}

/// The result of [`crate::Broker::poll`]: for a single task this is a direct
/// read of the Result Store; for a group, `state` is derived from the
/// children's states on every call rather than stored (§3).
#[derive(Debug, Clone)]
pub struct PolledRecord {
    pub task_id: TaskId,
    pub kind: TaskKind,
    pub name: TaskName,
    pub state: TaskState,
    pub children: Vec<TaskId>,
    pub metadata: TaskMetadata,
}

impl PolledRecord {
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}
