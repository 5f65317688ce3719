// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Task Record — the durable entity describing one dispatched task.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeMap;

use crate::error::HandlerError;

crate::define_id! {
    /// Opaque, globally unique identifier for a dispatched task (single or group).
    pub struct TaskId("task");
}

/// The registered name of a task handler, e.g. `rag.ingest_file`.
///
/// Newtype over [`SmolStr`] so that routing by queue prefix (`rag.* -> rag`)
/// doesn't allocate on every dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskName(pub SmolStr);

impl TaskName {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(SmolStr::new(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The queue-routing prefix: everything before the first `.`.
    pub fn prefix(&self) -> &str {
        self.0.as_str().split('.').next().unwrap_or(self.0.as_str())
    }
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Whether a Task Record describes a single task or an aggregated group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Single,
    Group,
}

crate::simple_display! {
    TaskKind {
        Single => "single",
        Group => "group",
    }
}

/// Observed (for single tasks) or derived (for groups, see [`TaskRecord::derive_group_state`])
/// lifecycle state of a task.
///
/// Transitions are monotonic along `Pending -> Started -> {Success, Failure}`
/// and `Pending | Started -> Revoked`. No other transition is valid; callers
/// that attempt one get [`crate::error::TransportError`] or are silently
/// idempotent, per the contract in `lf-storage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Started,
    Success { result: serde_json::Value },
    Failure { traceback: String },
    Revoked,
}

impl TaskState {
    pub fn kind(&self) -> TaskStateKind {
        match self {
            TaskState::Pending => TaskStateKind::Pending,
            TaskState::Started => TaskStateKind::Started,
            TaskState::Success { .. } => TaskStateKind::Success,
            TaskState::Failure { .. } => TaskStateKind::Failure,
            TaskState::Revoked => TaskStateKind::Revoked,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind(), TaskStateKind::Success | TaskStateKind::Failure | TaskStateKind::Revoked)
    }

    /// Whether `next` is a legal transition from `self`, per §3's invariant:
    /// `Pending -> Started -> {Success, Failure}` and `Pending|Started -> Revoked`.
    /// Re-applying the same terminal state is always legal (idempotent writes).
    pub fn can_transition_to(&self, next: &TaskState) -> bool {
        use TaskStateKind::*;
        if self.is_terminal() {
            return self.kind() == next.kind() && self == next;
        }
        matches!(
            (self.kind(), next.kind()),
            (Pending, Started) | (Pending, Success) | (Pending, Failure) | (Pending, Revoked)
                | (Started, Success) | (Started, Failure) | (Started, Revoked)
        )
    }

    pub fn result(&self) -> Option<&serde_json::Value> {
        match self {
            TaskState::Success { result } => Some(result),
            _ => None,
        }
    }

    pub fn traceback(&self) -> Option<&str> {
        match self {
            TaskState::Failure { traceback } => Some(traceback.as_str()),
            _ => None,
        }
    }

    pub fn from_handler_result(result: Result<serde_json::Value, HandlerError>) -> Self {
        match result {
            Ok(result) => TaskState::Success { result },
            Err(e) => TaskState::Failure { traceback: e.traceback },
        }
    }
}

/// Tag-only variant of [`TaskState`] for comparisons and wire protocol use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStateKind {
    Pending,
    Started,
    Success,
    Failure,
    Revoked,
}

crate::simple_display! {
    TaskStateKind {
        Pending => "PENDING",
        Started => "STARTED",
        Success => "SUCCESS",
        Failure => "FAILURE",
        Revoked => "REVOKED",
    }
}

/// Application-defined key/value metadata attached to a task: namespace,
/// project, file hashes, and (for the ingestion pipeline) progress reports.
pub type TaskMetadata = BTreeMap<String, serde_json::Value>;

/// The durable record persisted by the Result Store (see `lf-storage`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub kind: TaskKind,
    pub name: TaskName,
    pub state: TaskState,
    /// Present only for `kind: group`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskId>,
    #[serde(default)]
    pub metadata: TaskMetadata,
}

impl TaskRecord {
    pub fn new_pending(task_id: TaskId, name: TaskName, metadata: TaskMetadata) -> Self {
        Self { task_id, kind: TaskKind::Single, name, state: TaskState::Pending, children: Vec::new(), metadata }
    }

    pub fn new_group_pending(task_id: TaskId, name: TaskName, children: Vec<TaskId>, metadata: TaskMetadata) -> Self {
        Self { task_id, kind: TaskKind::Group, name, state: TaskState::Pending, children, metadata }
    }

    /// Derive a group's terminal state from its children's states, per §3:
    /// SUCCESS iff every child is SUCCESS; FAILURE if any child is FAILURE and
    /// none are still PENDING/STARTED; otherwise STARTED.
    pub fn derive_group_state(children: &[TaskState]) -> TaskState {
        if children.is_empty() {
            return TaskState::Success { result: serde_json::Value::Array(Vec::new()) };
        }
        if children.iter().all(|s| s.kind() == TaskStateKind::Success) {
            let results: Vec<_> = children.iter().filter_map(|s| s.result().cloned()).collect();
            return TaskState::Success { result: serde_json::Value::Array(results) };
        }
        let any_failure = children.iter().any(|s| s.kind() == TaskStateKind::Failure);
        let any_unsettled = children
            .iter()
            .any(|s| matches!(s.kind(), TaskStateKind::Pending | TaskStateKind::Started));
        if any_failure && !any_unsettled {
            let tracebacks: Vec<_> = children.iter().filter_map(|s| s.traceback()).collect();
            return TaskState::Failure { traceback: tracebacks.join("\n---\n") };
        }
        TaskState::Started
    }
}

/// The outcome payload of an aggregated group, re-derived from [`GroupRecord::children`]'s
/// states by the caller (the broker, which alone can read the Result Store).
#[derive(Debug, Clone)]
pub struct GroupRecord {
    pub task_id: TaskId,
    pub name: TaskName,
    pub children: Vec<TaskId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_splits_on_first_dot() {
        assert_eq!(TaskName::new("rag.ingest_file").prefix(), "rag");
        assert_eq!(TaskName::new("orchestration.health").prefix(), "orchestration");
        assert_eq!(TaskName::new("noop").prefix(), "noop");
    }

    #[test]
    fn valid_transitions_from_pending() {
        let pending = TaskState::Pending;
        assert!(pending.can_transition_to(&TaskState::Started));
        assert!(pending.can_transition_to(&TaskState::Revoked));
        assert!(pending.can_transition_to(&TaskState::Success { result: serde_json::json!(1) }));
    }

    #[test]
    fn terminal_states_reject_new_transitions() {
        let success = TaskState::Success { result: serde_json::json!(1) };
        assert!(!success.can_transition_to(&TaskState::Started));
        assert!(!success.can_transition_to(&TaskState::Failure { traceback: "x".into() }));
    }

    #[test]
    fn terminal_writes_are_idempotent() {
        let success = TaskState::Success { result: serde_json::json!({"n": 1}) };
        assert!(success.can_transition_to(&success.clone()));
    }

    #[test]
    fn group_state_success_iff_all_children_success() {
        let ok = TaskState::Success { result: serde_json::json!(1) };
        assert_eq!(TaskRecord::derive_group_state(&[ok.clone(), ok.clone()]).kind(), TaskStateKind::Success);
    }

    #[test]
    fn group_state_failure_when_settled_and_any_failed() {
        let ok = TaskState::Success { result: serde_json::json!(1) };
        let bad = TaskState::Failure { traceback: "boom".into() };
        let derived = TaskRecord::derive_group_state(&[ok, bad]);
        assert_eq!(derived.kind(), TaskStateKind::Failure);
    }

    #[test]
    fn group_state_started_while_children_unsettled() {
        let bad = TaskState::Failure { traceback: "boom".into() };
        let pending = TaskState::Pending;
        let derived = TaskRecord::derive_group_state(&[bad, pending]);
        assert_eq!(derived.kind(), TaskStateKind::Started);
    }

    #[test]
    fn result_and_traceback_are_mutually_exclusive() {
        let success = TaskState::Success { result: serde_json::json!(1) };
        assert!(success.result().is_some());
        assert!(success.traceback().is_none());

        let failure = TaskState::Failure { traceback: "boom".into() };
        assert!(failure.result().is_none());
        assert!(failure.traceback().is_some());
    }
}
