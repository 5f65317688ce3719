// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Convenience wrappers around [`crate::Broker::poll`].
//!
//! Two variants, never shared across scheduling models (§5, §9): `parallel`
//! sleeps on an OS thread for the multi-threaded worker/API-server model;
//! `cooperative` awaits a tokio sleep for the single-threaded event loop.
//! Both sleep non-busily, return on any terminal state, and raise
//! [`PollError::Timeout`] past the deadline — they never silently return a
//! default; callers that want one must opt in via the `_or` variants.

use std::time::{Duration, Instant};

use lf_core::TaskId;
use thiserror::Error;

use crate::error::BrokerError;
use crate::handle::PolledRecord;
use crate::producer::Broker;

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("task `{0}` did not reach a terminal state within the deadline")]
    Timeout(TaskId),
}

/// Parallel (OS-thread) poll wrapper, for the multi-threaded API server.
pub fn await_completion_parallel(
    broker: &Broker,
    task_id: &TaskId,
    timeout: Duration,
    interval: Duration,
) -> Result<PolledRecord, PollError> {
    let deadline = Instant::now() + timeout;
    loop {
        let polled = broker.poll(task_id)?;
        if polled.is_terminal() {
            return Ok(polled);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(PollError::Timeout(task_id.clone()));
        }
        std::thread::sleep(interval.min(deadline - now));
    }
}

/// Like [`await_completion_parallel`], but returns `default` instead of
/// raising [`PollError::Timeout`] — an explicit opt-in, never silent.
pub fn await_completion_parallel_or(
    broker: &Broker,
    task_id: &TaskId,
    timeout: Duration,
    interval: Duration,
    default: impl FnOnce() -> PolledRecord,
) -> Result<PolledRecord, BrokerError> {
    match await_completion_parallel(broker, task_id, timeout, interval) {
        Ok(record) => Ok(record),
        Err(PollError::Timeout(_)) => Ok(default()),
        Err(PollError::Broker(e)) => Err(e),
    }
}

/// Cooperative (single-threaded event-loop) poll wrapper, for the API
/// server's request handlers. Suspends at every await point rather than
/// blocking the event loop (§5).
pub async fn await_completion_cooperative(
    broker: &Broker,
    task_id: &TaskId,
    timeout: Duration,
    interval: Duration,
) -> Result<PolledRecord, PollError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let polled = broker.poll(task_id)?;
        if polled.is_terminal() {
            return Ok(polled);
        }
        let now = tokio::time::Instant::now();
        if now >= deadline {
            return Err(PollError::Timeout(task_id.clone()));
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// Like [`await_completion_cooperative`], but returns `default` instead of
/// raising [`PollError::Timeout`].
pub async fn await_completion_cooperative_or(
    broker: &Broker,
    task_id: &TaskId,
    timeout: Duration,
    interval: Duration,
    default: impl FnOnce() -> PolledRecord,
) -> Result<PolledRecord, BrokerError> {
    match await_completion_cooperative(broker, task_id, timeout, interval).await {
        Ok(record) => Ok(record),
        Err(PollError::Timeout(_)) => Ok(default()),
        Err(PollError::Broker(e)) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_core::TaskStateKind;
    use lf_storage::ResultStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn broker() -> (TempDir, Broker) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ResultStore::create(dir.path().join("store")).unwrap());
        let router = crate::router::QueueRouter::new().with_route("rag", "rag");
        (dir, Broker::new(store, dir.path().join("queue"), router))
    }

    #[test]
    fn parallel_poll_returns_once_terminal() {
        let (_dir, broker) = broker();
        let sig = broker.build_signature("rag.ingest_file", serde_json::json!({})).unwrap();
        let handle = broker.dispatch(sig).unwrap();
        broker.store().set_started(&handle.task_id).unwrap();
        broker.store().set_success(&handle.task_id, serde_json::json!(1)).unwrap();

        let polled =
            await_completion_parallel(&broker, &handle.task_id, Duration::from_secs(1), Duration::from_millis(5))
                .unwrap();
        assert_eq!(polled.state.kind(), TaskStateKind::Success);
    }

    #[test]
    fn parallel_poll_times_out_on_stuck_pending() {
        let (_dir, broker) = broker();
        let sig = broker.build_signature("rag.ingest_file", serde_json::json!({})).unwrap();
        let handle = broker.dispatch(sig).unwrap();

        let err = await_completion_parallel(
            &broker,
            &handle.task_id,
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .unwrap_err();
        assert!(matches!(err, PollError::Timeout(_)));
    }

    #[test]
    fn parallel_poll_or_returns_default_on_timeout() {
        let (_dir, broker) = broker();
        let sig = broker.build_signature("rag.ingest_file", serde_json::json!({})).unwrap();
        let handle = broker.dispatch(sig).unwrap();

        let default_record = PolledRecord {
            task_id: handle.task_id.clone(),
            kind: lf_core::TaskKind::Single,
            name: lf_core::TaskName::new("rag.ingest_file"),
            state: lf_core::TaskState::Failure { traceback: "degraded".into() },
            children: Vec::new(),
            metadata: lf_core::TaskMetadata::new(),
        };
        let polled = await_completion_parallel_or(
            &broker,
            &handle.task_id,
            Duration::from_millis(10),
            Duration::from_millis(5),
            || default_record.clone(),
        )
        .unwrap();
        assert_eq!(polled.state.kind(), TaskStateKind::Failure);
    }

    #[tokio::test]
    async fn cooperative_poll_returns_once_terminal() {
        let (_dir, broker) = broker();
        let sig = broker.build_signature("rag.ingest_file", serde_json::json!({})).unwrap();
        let handle = broker.dispatch(sig).unwrap();
        broker.store().set_started(&handle.task_id).unwrap();
        broker.store().set_success(&handle.task_id, serde_json::json!(1)).unwrap();

        let polled = await_completion_cooperative(
            &broker,
            &handle.task_id,
            Duration::from_secs(1),
            Duration::from_millis(5),
        )
        .await
        .unwrap();
        assert_eq!(polled.state.kind(), TaskStateKind::Success);
    }

    #[tokio::test]
    async fn cooperative_poll_times_out_on_stuck_pending() {
        let (_dir, broker) = broker();
        let sig = broker.build_signature("rag.ingest_file", serde_json::json!({})).unwrap();
        let handle = broker.dispatch(sig).unwrap();

        let err = await_completion_cooperative(
            &broker,
            &handle.task_id,
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PollError::Timeout(_)));
    }
}
