// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

use thiserror::Error;

/// Job-fatal errors (§4.3 "Failure semantics"). File- and chunk-level
/// failures never surface here — they are recorded in [`crate::job::IngestResult::skipped`]
/// and otherwise swallowed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown processing strategy `{0}`")]
    UnknownStrategy(String),

    #[error("unknown database `{0}`")]
    UnknownDatabase(String),

    #[error("unknown parser `{0}`")]
    UnknownParser(String),

    #[error("unknown extractor `{0}`")]
    UnknownExtractor(String),

    #[error("embedding dimension mismatch: collection expects {expected}, embedder returned {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("every file was skipped or errored")]
    NothingProcessed,

    #[error("vector store unreachable after retries: {0}")]
    VectorStoreUnreachable(String),

    #[error(transparent)]
    Adapter(#[from] lf_adapters::AdapterError),

    #[error(transparent)]
    Store(#[from] lf_storage::StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
