// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Drives one `ingest_file` job through the six stages of §4.3, emitting
//! progress into the Task Record as it goes.

use std::path::Path;
use std::time::{Duration, Instant};

use lf_adapters::{clean_metadata, UpsertRecord};
use lf_broker::RevocationFlag;
use lf_core::{PipelineStage, Progress, TaskId};
use lf_manifest::ProjectManifest;
use lf_storage::ResultStore;

use crate::context::PipelineContext;
use crate::dedup::DedupIndex;
use crate::discovery::discover;
use crate::error::PipelineError;
use crate::job::{IngestArgs, IngestResult, SkippedEntry};

const VECTOR_STORE_RETRIES: u32 = 3;
const VECTOR_STORE_RETRY_BACKOFF: Duration = Duration::from_millis(200);

struct PendingChunk {
    chunk_id: String,
    text: String,
    metadata: std::collections::BTreeMap<String, serde_json::Value>,
}

/// Run one ingestion job end to end. Returns the job's result payload on
/// success (possibly partial) or a [`PipelineError`] for the job-fatal
/// conditions of §4.3 "Failure semantics".
pub async fn run_ingest(
    store: &ResultStore,
    task_id: &TaskId,
    revocation: &RevocationFlag,
    ctx: &PipelineContext,
    manifest: &ProjectManifest,
    dedup_path: &Path,
    args: &IngestArgs,
) -> Result<IngestResult, PipelineError> {
    let started_at = Instant::now();

    let strategy = manifest
        .strategies
        .get(&args.processing_strategy)
        .ok_or_else(|| PipelineError::UnknownStrategy(args.processing_strategy.clone()))?;
    manifest
        .databases
        .get(&args.database_name)
        .ok_or_else(|| PipelineError::UnknownDatabase(args.database_name.clone()))?;
    let embedder = ctx
        .embedder(&args.database_name)
        .ok_or_else(|| PipelineError::UnknownDatabase(args.database_name.clone()))?
        .clone();
    let vector_store = ctx
        .vector_store(&args.database_name)
        .ok_or_else(|| PipelineError::UnknownDatabase(args.database_name.clone()))?
        .clone();

    emit(store, task_id, Progress::new(PipelineStage::Discovering, 0, "walking source path"))?;
    let (discovered, mut skipped) = discover(Path::new(&args.source_path), strategy);

    emit(
        store,
        task_id,
        Progress::new(PipelineStage::Parsing, 5, format!("parsing {} file(s)", discovered.len())),
    )?;

    let mut dedup = DedupIndex::load(dedup_path)?;
    let mut pending = Vec::new();
    let mut processed_files: u64 = 0;

    for file in &discovered {
        if revocation.is_revoked() {
            return Err(PipelineError::NothingProcessed);
        }

        let bytes = match std::fs::read(&file.path) {
            Ok(b) => b,
            Err(e) => {
                skipped.push(SkippedEntry::new(&file.relative_path, format!("unreadable: {e}")));
                continue;
            }
        };

        let parser = match ctx.parser(&file.parser_rule.parser) {
            Some(p) => p,
            None => {
                skipped.push(SkippedEntry::new(
                    &file.relative_path,
                    format!("unknown parser `{}`", file.parser_rule.parser),
                ));
                continue;
            }
        };

        let chunks = match parser.parse(&bytes) {
            Ok(c) => c,
            Err(e) => {
                skipped.push(SkippedEntry::new(&file.relative_path, format!("parse failed: {e}")));
                continue;
            }
        };

        let document_hash = lf_adapters::hash::document_hash(&bytes);
        processed_files += 1;

        for (index, chunk) in chunks.into_iter().enumerate() {
            if chunk.text.trim().is_empty() {
                skipped.push(SkippedEntry::new(&file.relative_path, "empty chunk after parsing"));
                continue;
            }

            let mut metadata = chunk.metadata;
            for extractor_ref in &strategy.extractors {
                let Some(extractor) = ctx.extractor(&extractor_ref.extractor) else {
                    tracing::warn!(extractor = %extractor_ref.extractor, "unknown extractor, skipping");
                    continue;
                };
                match extractor.extract(&chunk.text, &metadata) {
                    Ok(extra) => metadata.extend(extra),
                    Err(e) => tracing::warn!(extractor = %extractor_ref.extractor, error = %e, "extractor failed, skipping"),
                }
            }

            let chunk_id = lf_adapters::hash::chunk_id(&document_hash, index);
            if dedup.contains(&chunk_id) {
                continue;
            }
            metadata.insert(crate::CHUNK_TEXT_METADATA_KEY.to_string(), serde_json::Value::String(chunk.text.clone()));
            pending.push(PendingChunk { chunk_id, text: chunk.text, metadata });
        }
    }

    if processed_files == 0 {
        return Err(PipelineError::NothingProcessed);
    }

    let existing_dimension = vector_store.dimension().await?;
    let mut stored_chunks: u64 = 0;
    let total_pending = pending.len();

    for (batch_index, batch) in pending.chunks(ctx.batch_size.max(1)).enumerate() {
        if revocation.is_revoked() {
            break;
        }

        let progress = ((batch_index * ctx.batch_size * 100) / total_pending.max(1)).min(99) as u8;
        emit(store, task_id, Progress::new(PipelineStage::Embedding, progress, "embedding batch"))?;

        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = match embedder.embed(&texts).await {
            Ok(v) => v,
            Err(e) => {
                for chunk in batch {
                    skipped.push(SkippedEntry::new(&chunk.chunk_id, format!("embedding failed: {e}")));
                }
                continue;
            }
        };

        let mut records = Vec::with_capacity(batch.len());
        for (chunk, vector) in batch.iter().zip(vectors.into_iter()) {
            if vector.iter().any(|v| v.is_nan()) {
                skipped.push(SkippedEntry::new(&chunk.chunk_id, "embedding returned NaN"));
                continue;
            }
            if let Some(expected) = existing_dimension {
                if vector.len() != expected {
                    return Err(PipelineError::DimensionMismatch { expected, actual: vector.len() });
                }
            }
            records.push(UpsertRecord {
                chunk_id: chunk.chunk_id.clone(),
                vector,
                metadata: clean_metadata(&chunk.metadata),
            });
        }

        if records.is_empty() {
            continue;
        }

        emit(store, task_id, Progress::new(PipelineStage::Storing, progress, "storing batch"))?;
        upsert_with_retries(vector_store.as_ref(), records.clone()).await?;

        for record in &records {
            dedup.insert(record.chunk_id.clone());
        }
        stored_chunks += records.len() as u64;
    }

    dedup.flush()?;

    emit(store, task_id, Progress::new(PipelineStage::Done, 100, "ingestion complete"))?;

    Ok(IngestResult {
        processed_files,
        stored_chunks,
        skipped,
        duration_seconds: started_at.elapsed().as_secs_f64(),
    })
}

async fn upsert_with_retries(
    vector_store: &(dyn lf_adapters::VectorStore),
    records: Vec<UpsertRecord>,
) -> Result<(), PipelineError> {
    let mut last_error = None;
    for attempt in 0..VECTOR_STORE_RETRIES {
        match vector_store.upsert(records.clone()).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                last_error = Some(e);
                if attempt + 1 < VECTOR_STORE_RETRIES {
                    tokio::time::sleep(VECTOR_STORE_RETRY_BACKOFF).await;
                }
            }
        }
    }
    Err(PipelineError::VectorStoreUnreachable(
        last_error.map(|e| e.to_string()).unwrap_or_default(),
    ))
}

fn emit(store: &ResultStore, task_id: &TaskId, progress: Progress) -> Result<(), PipelineError> {
    let mut updates = lf_core::TaskMetadata::new();
    updates.insert("progress".to_string(), progress.into_metadata_value());
    store.merge_metadata(task_id, updates)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use lf_adapters::{FakeEmbedder, FakeParser, FakeVectorStore};
    use lf_core::{TaskMetadata, TaskName};
    use lf_manifest::{Database, DirectoryFilter, EmbeddingStrategy, ParserRule, ProcessingStrategy, VectorStoreConfig};
    use lf_storage::ResultStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn manifest_with_one_database() -> ProjectManifest {
        let parsers = vec![ParserRule {
            parser: "fake".into(),
            file_extensions: vec!["txt".to_string()],
            options: Default::default(),
            chunk_size: None,
            chunk_overlap: None,
        }];
        let strategy =
            ProcessingStrategy { filter: DirectoryFilter::default(), parsers, extractors: vec![] };
        let mut strategies = IndexMap::new();
        strategies.insert("default".to_string(), strategy);

        let database = Database {
            embedding_strategy: EmbeddingStrategy::ModelId("fake-model".into()),
            retrieval_strategy: Default::default(),
            vector_store: VectorStoreConfig { store_type: "fake".into(), options: Default::default() },
        };
        let mut databases = IndexMap::new();
        databases.insert("main".to_string(), database);

        ProjectManifest {
            namespace: lf_manifest::Namespace("acme".into()),
            name: "demo".into(),
            models: vec![],
            prompts: vec![],
            databases,
            strategies,
            datasets: vec![],
        }
    }

    #[tokio::test]
    async fn ingest_single_file_stores_chunks_and_reports_progress() {
        let source_dir = TempDir::new().unwrap();
        std::fs::write(source_dir.path().join("a.txt"), b"hello world").unwrap();
        let dedup_dir = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();

        let store = ResultStore::create(store_dir.path()).unwrap();
        let task_id = lf_core::TaskId::new();
        store.put_pending(task_id.clone(), TaskName::new("rag.ingest_file"), TaskMetadata::new()).unwrap();
        store.set_started(&task_id).unwrap();
        let revocation = RevocationFlag::new(Arc::new(store.clone()), task_id.clone());

        let mut ctx = PipelineContext::new();
        ctx.register_parser("fake", Arc::new(FakeParser::new(1024)));
        ctx.register_embedder("main", Arc::new(FakeEmbedder::new(4)));
        ctx.register_vector_store("main", Arc::new(FakeVectorStore::new()));

        let manifest = manifest_with_one_database();
        let args = IngestArgs {
            project_dir: source_dir.path().to_string_lossy().into_owned(),
            database_name: "main".into(),
            processing_strategy: "default".into(),
            source_path: source_dir.path().to_string_lossy().into_owned(),
        };

        let result = run_ingest(
            &store,
            &task_id,
            &revocation,
            &ctx,
            &manifest,
            &dedup_dir.path().join("dedup.json"),
            &args,
        )
        .await
        .unwrap();

        assert_eq!(result.processed_files, 1);
        assert_eq!(result.stored_chunks, 1);
        assert!(result.skipped.is_empty());

        let record = store.get(&task_id).unwrap();
        assert!(record.metadata.contains_key("progress"));
    }

    #[tokio::test]
    async fn job_fails_when_every_file_is_skipped() {
        let source_dir = TempDir::new().unwrap();
        std::fs::write(source_dir.path().join("a.bin"), b"hello").unwrap();
        let dedup_dir = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();

        let store = ResultStore::create(store_dir.path()).unwrap();
        let task_id = lf_core::TaskId::new();
        store.put_pending(task_id.clone(), TaskName::new("rag.ingest_file"), TaskMetadata::new()).unwrap();
        store.set_started(&task_id).unwrap();
        let revocation = RevocationFlag::new(Arc::new(store.clone()), task_id.clone());

        let mut ctx = PipelineContext::new();
        ctx.register_embedder("main", Arc::new(FakeEmbedder::new(4)));
        ctx.register_vector_store("main", Arc::new(FakeVectorStore::new()));

        let manifest = manifest_with_one_database();
        let args = IngestArgs {
            project_dir: source_dir.path().to_string_lossy().into_owned(),
            database_name: "main".into(),
            processing_strategy: "default".into(),
            source_path: source_dir.path().to_string_lossy().into_owned(),
        };

        let err = run_ingest(
            &store,
            &task_id,
            &revocation,
            &ctx,
            &manifest,
            &dedup_dir.path().join("dedup.json"),
            &args,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::NothingProcessed));
    }

    #[tokio::test]
    async fn deduplicated_chunk_is_not_restored_on_second_run() {
        let source_dir = TempDir::new().unwrap();
        std::fs::write(source_dir.path().join("a.txt"), b"hello world").unwrap();
        let dedup_dir = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let dedup_path = dedup_dir.path().join("dedup.json");

        let store = ResultStore::create(store_dir.path()).unwrap();
        let manifest = manifest_with_one_database();
        let args = IngestArgs {
            project_dir: source_dir.path().to_string_lossy().into_owned(),
            database_name: "main".into(),
            processing_strategy: "default".into(),
            source_path: source_dir.path().to_string_lossy().into_owned(),
        };

        let mut ctx = PipelineContext::new();
        ctx.register_parser("fake", Arc::new(FakeParser::new(1024)));
        ctx.register_embedder("main", Arc::new(FakeEmbedder::new(4)));
        ctx.register_vector_store("main", Arc::new(FakeVectorStore::new()));

        let first_task = lf_core::TaskId::new();
        store.put_pending(first_task.clone(), TaskName::new("rag.ingest_file"), TaskMetadata::new()).unwrap();
        store.set_started(&first_task).unwrap();
        let revocation = RevocationFlag::new(Arc::new(store.clone()), first_task.clone());
        let first = run_ingest(&store, &first_task, &revocation, &ctx, &manifest, &dedup_path, &args)
            .await
            .unwrap();
        assert_eq!(first.stored_chunks, 1);

        let second_task = lf_core::TaskId::new();
        store.put_pending(second_task.clone(), TaskName::new("rag.ingest_file"), TaskMetadata::new()).unwrap();
        store.set_started(&second_task).unwrap();
        let revocation = RevocationFlag::new(Arc::new(store.clone()), second_task.clone());
        let second = run_ingest(&store, &second_task, &revocation, &ctx, &manifest, &dedup_path, &args)
            .await
            .unwrap();
        assert_eq!(second.stored_chunks, 0, "already-known chunk must not be restored");
    }
}
