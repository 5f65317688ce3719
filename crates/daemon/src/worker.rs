// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Bridges the Task Broker's synchronous [`Handler`] contract to the async
//! ingestion pipeline (§4.3 runs on its own blocking worker thread, §5
//! "Worker runs synchronously end-to-end").

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lf_broker::{Consumer, Handler};
use lf_core::HandlerError;
use lf_pipeline::{IngestArgs, PipelineContext};

/// Register the `rag.ingest_file` handler on `consumer`. `rt` is a handle to
/// the tokio runtime driving adapters (embedder/vector-store calls); the
/// worker thread itself is plain blocking code, so it calls back into async
/// code with `rt.block_on`, never the other way around.
pub fn register_ingest_handler(
    consumer: &mut Consumer,
    state_root: PathBuf,
    ctx: Arc<PipelineContext>,
    rt: tokio::runtime::Handle,
) {
    let handler: Handler = Box::new(move |args, revocation| {
        let ingest_args: IngestArgs =
            serde_json::from_value(args).map_err(|e| HandlerError::new(format!("invalid ingest_file args: {e}")))?;

        let manifest_path = Path::new(&ingest_args.project_dir).join("manifest.yaml");
        let manifest = lf_manifest::load_from_path(&manifest_path)
            .map_err(|e| HandlerError::new(format!("failed to load manifest: {e}")))?;

        let dedup_path = state_root.join("vector_store").join(&ingest_args.database_name).join("dedup.json");

        let store = revocation.store().clone();
        let task_id = revocation.task_id().clone();

        let result = rt.block_on(lf_pipeline::run_ingest(
            &store,
            &task_id,
            revocation,
            &ctx,
            &manifest,
            &dedup_path,
            &ingest_args,
        ));

        match result {
            Ok(outcome) => serde_json::to_value(outcome)
                .map_err(|e| HandlerError::new(format!("failed to serialize ingest result: {e}"))),
            Err(e) => Err(HandlerError::new(e.to_string())),
        }
    });
    consumer.register("rag.ingest_file", handler);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_broker::{FsQueue, QueueMessage, RevocationFlag};
    use lf_core::{Signature, TaskId, TaskMetadata, TaskName, TaskStateKind};
    use lf_storage::ResultStore;
    use tempfile::TempDir;

    fn write_manifest(project_dir: &Path) {
        std::fs::write(
            project_dir.join("manifest.yaml"),
            r#"
namespace: acme
name: demo
models:
  - id: fake-model
    repo: acme/fake-model
databases:
  main:
    embedding_strategy: fake-model
    retrieval_strategy:
      top_k: 5
    vector_store:
      type: fake
processing_strategies:
  default:
    filter: {}
    parsers:
      - parser: fake
        file_extensions: [txt]
    extractors: []
"#,
        )
        .expect("write manifest");
    }

    #[test]
    fn registers_handler_under_the_ingest_file_name() {
        let dir = TempDir::new().expect("tempdir");
        let store = Arc::new(ResultStore::create(dir.path().join("store")).expect("store"));
        let queue = Arc::new(FsQueue::open(dir.path().join("queue")).expect("queue"));
        let mut consumer = Consumer::new(store.clone(), queue.clone(), "worker-1");

        let rt = tokio::runtime::Runtime::new().expect("runtime");
        let ctx = Arc::new(PipelineContext::new());
        register_ingest_handler(&mut consumer, dir.path().to_path_buf(), ctx, rt.handle().clone());

        let project_dir = dir.path().join("project");
        std::fs::create_dir_all(&project_dir).expect("project dir");
        write_manifest(&project_dir);
        std::fs::write(project_dir.join("source.txt"), b"hi").expect("source file");

        let task_id = TaskId::new();
        store.put_pending(task_id.clone(), TaskName::new("rag.ingest_file"), TaskMetadata::new()).expect("put_pending");
        let args = serde_json::json!({
            "project_dir": project_dir.to_string_lossy(),
            "database_name": "main",
            "processing_strategy": "default",
            "source_path": project_dir.to_string_lossy(),
        });
        queue
            .enqueue(&QueueMessage { task_id: task_id.clone(), signature: Signature::new("rag.ingest_file", args).expect("signature") })
            .expect("enqueue");

        assert!(consumer.tick().expect("tick"));
        let record = store.get(&task_id).expect("record");
        // No embedder/vector-store registered for "main" -> handler reports failure,
        // not a panic; proves the bridge runs the async pipeline to completion.
        assert_eq!(record.state.kind(), TaskStateKind::Failure);
        let _ = RevocationFlag::new(store.clone(), task_id);
    }
}
