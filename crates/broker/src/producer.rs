// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Producer-side broker API: build a signature, dispatch it, poll for its
//! outcome, revoke it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use lf_core::{Signature, TaskId, TaskKind, TaskMetadata, TaskName, TaskRecord};
use lf_storage::ResultStore;
use parking_lot::Mutex;

use crate::error::BrokerError;
use crate::handle::{GroupHandle, PolledRecord, TaskHandle};
use crate::queue::{FsQueue, QueueMessage};
use crate::router::QueueRouter;

/// The producer-facing half of the Task Broker.
///
/// Neither the broker nor its callers import the consumer's handler code —
/// they communicate only through dispatched signatures and the Result
/// Store (§4.2).
pub struct Broker {
    store: Arc<ResultStore>,
    router: QueueRouter,
    queue_root: PathBuf,
    queues: Mutex<HashMap<String, Arc<FsQueue>>>,
}

impl Broker {
    pub fn new(store: Arc<ResultStore>, queue_root: impl Into<PathBuf>, router: QueueRouter) -> Self {
        Self { store, router, queue_root: queue_root.into(), queues: Mutex::new(HashMap::new()) }
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Construct an unsent reference to a task. No I/O.
    pub fn build_signature(
        &self,
        name: impl Into<TaskName>,
        args: impl serde::Serialize,
    ) -> Result<Signature, serde_json::Error> {
        Signature::new(name, args)
    }

    fn queue_for(&self, name: &str) -> Result<Arc<FsQueue>, BrokerError> {
        let mut queues = self.queues.lock();
        if let Some(queue) = queues.get(name) {
            return Ok(queue.clone());
        }
        let queue = Arc::new(FsQueue::open(self.queue_root.join(name))?);
        queues.insert(name.to_string(), queue.clone());
        Ok(queue)
    }

    /// Enqueue `sig`, writing a PENDING Task Record first. Returns a handle
    /// containing the new `task_id`.
    pub fn dispatch(&self, sig: Signature) -> Result<TaskHandle, BrokerError> {
        let queue_name = self.router.route(&sig.name)?.to_string();
        let task_id = TaskId::new();
        self.store.put_pending(task_id.clone(), sig.name.clone(), TaskMetadata::new())?;
        let queue = self.queue_for(&queue_name)?;
        queue.enqueue(&QueueMessage { task_id: task_id.clone(), signature: sig })?;
        Ok(TaskHandle { task_id })
    }

    /// Enqueue every child in `sigs`, then write one PENDING group record
    /// whose `children` list names all of them.
    pub fn dispatch_group(&self, sigs: Vec<Signature>) -> Result<GroupHandle, BrokerError> {
        let mut children = Vec::with_capacity(sigs.len());
        for sig in sigs {
            children.push(self.dispatch(sig)?.task_id);
        }
        let group_id = TaskId::new();
        self.store.put_group_pending(
            group_id.clone(),
            TaskName::new("group"),
            children.clone(),
            TaskMetadata::new(),
        )?;
        Ok(GroupHandle { task_id: group_id, children })
    }

    /// Side-effect-free read. For a group, `state` is re-derived from the
    /// children on every call (§3) rather than trusted from the stored
    /// parent record.
    pub fn poll(&self, task_id: &TaskId) -> Result<PolledRecord, BrokerError> {
        let record = self.store.get(task_id)?;
        if record.kind == TaskKind::Group {
            let mut child_states = Vec::with_capacity(record.children.len());
            for child in &record.children {
                child_states.push(self.store.get(child)?.state);
            }
            let state = TaskRecord::derive_group_state(&child_states);
            Ok(PolledRecord {
                task_id: record.task_id,
                kind: record.kind,
                name: record.name,
                state,
                children: record.children,
                metadata: record.metadata,
            })
        } else {
            Ok(PolledRecord {
                task_id: record.task_id,
                kind: record.kind,
                name: record.name,
                state: record.state,
                children: record.children,
                metadata: record.metadata,
            })
        }
    }

    /// Mark `task_id` REVOKED. For a group, revokes every child too — a
    /// parent revoke implies revoking every non-terminal child (§4.2). Since
    /// revoke is idempotent and always wins on a terminal record (§8), it's
    /// safe to call on already-terminal children.
    pub fn revoke(&self, task_id: &TaskId) -> Result<(), BrokerError> {
        let record = self.store.get(task_id)?;
        self.store.revoke(task_id)?;
        if record.kind == TaskKind::Group {
            for child in &record.children {
                self.store.revoke(child)?;
            }
        }
        Ok(())
    }
}
