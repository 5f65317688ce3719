// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Everything a job needs that isn't carried in its [`crate::job::IngestArgs`]:
//! the adapter registries, the embedder/vector store for the target
//! database, and tunables (batch size, progress interval).

use std::collections::HashMap;
use std::sync::Arc;

use lf_adapters::{Embedder, Extractor, Parser, VectorStore};

/// Adapters and tunables shared across every job a worker runs. Built once
/// at worker startup from the project manifest plus whatever concrete
/// adapters the caller registers.
pub struct PipelineContext {
    parsers: HashMap<String, Arc<dyn Parser>>,
    extractors: HashMap<String, Arc<dyn Extractor>>,
    embedders: HashMap<String, Arc<dyn Embedder>>,
    vector_stores: HashMap<String, Arc<dyn VectorStore>>,
    /// Number of chunks submitted to the embedder per batch (§4.3 stage 5;
    /// spec default range 16-32).
    pub batch_size: usize,
    /// Emit a progress update at least once per this many chunks processed
    /// within EMBEDDING/STORING.
    pub progress_interval: usize,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
            extractors: HashMap::new(),
            embedders: HashMap::new(),
            vector_stores: HashMap::new(),
            batch_size: 32,
            progress_interval: 50,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn register_parser(&mut self, name: impl Into<String>, parser: Arc<dyn Parser>) {
        self.parsers.insert(name.into(), parser);
    }

    pub fn register_extractor(&mut self, name: impl Into<String>, extractor: Arc<dyn Extractor>) {
        self.extractors.insert(name.into(), extractor);
    }

    pub fn register_embedder(&mut self, database_name: impl Into<String>, embedder: Arc<dyn Embedder>) {
        self.embedders.insert(database_name.into(), embedder);
    }

    pub fn register_vector_store(&mut self, database_name: impl Into<String>, store: Arc<dyn VectorStore>) {
        self.vector_stores.insert(database_name.into(), store);
    }

    pub fn parser(&self, name: &str) -> Option<&Arc<dyn Parser>> {
        self.parsers.get(name)
    }

    pub fn extractor(&self, name: &str) -> Option<&Arc<dyn Extractor>> {
        self.extractors.get(name)
    }

    pub fn embedder(&self, database_name: &str) -> Option<&Arc<dyn Embedder>> {
        self.embedders.get(database_name)
    }

    pub fn vector_store(&self, database_name: &str) -> Option<&Arc<dyn VectorStore>> {
        self.vector_stores.get(database_name)
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}
