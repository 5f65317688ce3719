// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Filesystem-backed queue transport: messages are files in a directory,
//! consumers rename-to-claim. Preserves at-least-once delivery — a claim
//! that crashes before the handler records a terminal state leaves the
//! message sitting unclaimed in nobody's queue (it was already moved into
//! the claimant's private subdirectory), so redelivery is not automatic on
//! crash; the broker relies on the Result Store + manual resubmission for
//! that case, not on this transport. Handlers MUST be idempotent under
//! duplicate delivery regardless (§4.2).

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use lf_core::{Signature, TaskId, TransportError};
use serde::{Deserialize, Serialize};

static SEQ: AtomicU64 = AtomicU64::new(0);

/// One enqueued unit of work: the task it was dispatched as, plus the
/// signature the consumer needs to invoke the right handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub task_id: TaskId,
    pub signature: Signature,
}

/// A single named queue, backed by a directory. Claimed messages move into
/// a `.claimed` subdirectory rather than being deleted, so a crashed
/// consumer's claims are inspectable for operator recovery.
#[derive(Debug, Clone)]
pub struct FsQueue {
    root: PathBuf,
    claimed_dir: PathBuf,
}

impl FsQueue {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, TransportError> {
        let root = root.into();
        let claimed_dir = root.join(".claimed");
        fs::create_dir_all(&root).map_err(TransportError::QueueUnwritable)?;
        fs::create_dir_all(&claimed_dir).map_err(TransportError::QueueUnwritable)?;
        Ok(Self { root, claimed_dir })
    }

    /// Write `message` as a new file. Filenames are ordered by an
    /// ever-increasing counter so claim order matches enqueue order within
    /// one process; cross-process ordering is not guaranteed (§5: no
    /// cross-task ordering guarantee).
    pub fn enqueue(&self, message: &QueueMessage) -> Result<(), TransportError> {
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        let name = format!("{seq:020}-{}.json", message.task_id.as_str());
        let final_path = self.root.join(&name);
        let tmp_path = self.root.join(format!(".{name}.tmp"));
        let bytes = serde_json::to_vec(message).map_err(|e| {
            TransportError::QueueUnwritable(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        fs::write(&tmp_path, &bytes).map_err(TransportError::QueueUnwritable)?;
        fs::rename(&tmp_path, &final_path).map_err(TransportError::QueueUnwritable)?;
        Ok(())
    }

    /// Attempt to claim the oldest unclaimed message by renaming it into
    /// `.claimed/<claimant>/`. Returns `None` if the queue is empty. Races
    /// with other consumers are resolved by `fs::rename` failing for
    /// whoever loses; the loser moves on to the next candidate.
    pub fn claim(&self, claimant: &str) -> Result<Option<QueueMessage>, TransportError> {
        let mut entries: Vec<_> = fs::read_dir(&self.root)
            .map_err(TransportError::QueueUnwritable)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name().and_then(|n| n.to_str()).is_some_and(|n| !n.starts_with('.'))
            })
            .collect();
        entries.sort();

        let claimant_dir = self.claimed_dir.join(claimant);
        fs::create_dir_all(&claimant_dir).map_err(TransportError::QueueUnwritable)?;

        for entry in entries {
            let Some(file_name) = entry.file_name() else { continue };
            let dest = claimant_dir.join(file_name);
            match fs::rename(&entry, &dest) {
                Ok(()) => {
                    let bytes = fs::read(&dest).map_err(TransportError::QueueUnwritable)?;
                    let message: QueueMessage = serde_json::from_slice(&bytes).map_err(|e| {
                        TransportError::QueueUnwritable(std::io::Error::new(
                            std::io::ErrorKind::InvalidData,
                            e,
                        ))
                    })?;
                    return Ok(Some(message));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(TransportError::QueueUnwritable(e)),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_core::Signature;
    use tempfile::TempDir;

    fn message() -> QueueMessage {
        QueueMessage {
            task_id: TaskId::new(),
            signature: Signature::new("rag.ingest_file", serde_json::json!({"a": 1})).unwrap(),
        }
    }

    #[test]
    fn enqueue_then_claim_round_trips() {
        let dir = TempDir::new().unwrap();
        let queue = FsQueue::open(dir.path()).unwrap();
        let msg = message();
        queue.enqueue(&msg).unwrap();
        let claimed = queue.claim("worker-1").unwrap().unwrap();
        assert_eq!(claimed.task_id, msg.task_id);
    }

    #[test]
    fn claim_on_empty_queue_returns_none() {
        let dir = TempDir::new().unwrap();
        let queue = FsQueue::open(dir.path()).unwrap();
        assert!(queue.claim("worker-1").unwrap().is_none());
    }

    #[test]
    fn two_consumers_never_claim_the_same_message() {
        let dir = TempDir::new().unwrap();
        let queue = FsQueue::open(dir.path()).unwrap();
        queue.enqueue(&message()).unwrap();

        let first = queue.claim("worker-1").unwrap();
        let second = queue.claim("worker-2").unwrap();
        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[test]
    fn claims_are_delivered_in_enqueue_order() {
        let dir = TempDir::new().unwrap();
        let queue = FsQueue::open(dir.path()).unwrap();
        let first = message();
        let second = message();
        queue.enqueue(&first).unwrap();
        queue.enqueue(&second).unwrap();

        let claimed_first = queue.claim("worker-1").unwrap().unwrap();
        assert_eq!(claimed_first.task_id, first.task_id);
        let claimed_second = queue.claim("worker-1").unwrap().unwrap();
        assert_eq!(claimed_second.task_id, second.task_id);
    }
}
