// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! The `ingest_file` task's arguments and result payload (§4.3).

use serde::{Deserialize, Serialize};

/// Arguments carried in the `rag.ingest_file` task's Signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestArgs {
    pub project_dir: String,
    pub database_name: String,
    pub processing_strategy: String,
    pub source_path: String,
}

/// One file or chunk the job decided not to process, with a human-readable
/// reason (unmatched extension, unreadable file, parser error, embedding
/// failure, empty-after-parsing).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

impl SkippedEntry {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { path: path.into(), reason: reason.into() }
    }
}

/// The job result payload stored in the Task Record on success (§4.3
/// "Result payload").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IngestResult {
    pub processed_files: u64,
    pub stored_chunks: u64,
    pub skipped: Vec<SkippedEntry>,
    pub duration_seconds: f64,
}
