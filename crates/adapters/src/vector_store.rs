// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Vector stores: upsert `(chunk_id, vector, metadata)` and answer an
//! existence check used as a fallback to the pipeline's own deduplication
//! index (§4.3 stage 6, §4.3 stage 4).

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::AdapterError;
use crate::metadata::MetadataValue;

/// One record ready to upsert: a chunk's id, embedding, and cleaned
/// (scalar-only) metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertRecord {
    pub chunk_id: String,
    pub vector: Vec<f32>,
    pub metadata: BTreeMap<String, MetadataValue>,
}

/// One nearest-neighbor match returned by [`VectorStore::query`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub score: f32,
    pub metadata: BTreeMap<String, MetadataValue>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    fn name(&self) -> &str;

    /// Upsert a batch of records into this store's collection.
    async fn upsert(&self, records: Vec<UpsertRecord>) -> Result<(), AdapterError>;

    /// Fallback existence check; the pipeline's own dedup index is
    /// authoritative and this is only consulted when that index misses.
    async fn exists(&self, chunk_id: &str) -> Result<bool, AdapterError>;

    /// The dimension of vectors already stored in this collection, or
    /// `None` if the collection is empty (no dimension established yet).
    async fn dimension(&self) -> Result<Option<usize>, AdapterError>;

    /// The `k` nearest matches to `vector`, highest score first. Score is a
    /// similarity, not a distance (higher is closer).
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>, AdapterError>;
}
