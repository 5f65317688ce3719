// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! In-memory fakes for each adapter trait, exported for other crates' tests
//! (e.g. `lf-pipeline`) under the `test-support` feature — mirrors the
//! teacher repo's `FakeAgentAdapter` convention.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::embedder::Embedder;
use crate::error::AdapterError;
use crate::extractor::Extractor;
use crate::parser::{ParsedChunk, Parser};
use crate::vector_store::{ScoredChunk, UpsertRecord, VectorStore};

/// Splits bytes (as UTF-8 text) into fixed-size chunks. Good enough for
/// tests that need deterministic, inspectable chunking without pulling in a
/// real document parser.
pub struct FakeParser {
    chunk_size: usize,
}

impl FakeParser {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size: chunk_size.max(1) }
    }
}

impl Parser for FakeParser {
    fn name(&self) -> &str {
        "fake"
    }

    fn parse(&self, bytes: &[u8]) -> Result<Vec<ParsedChunk>, AdapterError> {
        let text = std::str::from_utf8(bytes).map_err(|e| AdapterError::Parse(e.to_string()))?;
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(text
            .as_bytes()
            .chunks(self.chunk_size)
            .map(|c| ParsedChunk::new(String::from_utf8_lossy(c).into_owned()))
            .collect())
    }
}

/// Tags every chunk with its byte length. Records every call for assertions.
#[derive(Default)]
pub struct FakeExtractor {
    pub calls: Mutex<usize>,
}

impl Extractor for FakeExtractor {
    fn name(&self) -> &str {
        "fake"
    }

    fn extract(
        &self,
        text: &str,
        _metadata: &BTreeMap<String, serde_json::Value>,
    ) -> Result<BTreeMap<String, serde_json::Value>, AdapterError> {
        *self.calls.lock() += 1;
        let mut out = BTreeMap::new();
        out.insert("char_len".to_string(), serde_json::json!(text.chars().count()));
        Ok(out)
    }
}

/// Deterministic embedder: one fixed-dimension vector per text, derived
/// from the text's byte length so distinct inputs get distinct vectors.
pub struct FakeEmbedder {
    dimension: usize,
}

impl FakeEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AdapterError> {
        Ok(texts
            .iter()
            .map(|t| {
                let seed = t.len() as f32;
                (0..self.dimension).map(|i| seed + i as f32).collect()
            })
            .collect())
    }
}

/// In-memory vector store keyed by `chunk_id`, for tests.
#[derive(Default)]
pub struct FakeVectorStore {
    records: Arc<Mutex<BTreeMap<String, UpsertRecord>>>,
}

impl FakeVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored_count(&self) -> usize {
        self.records.lock().len()
    }

    pub fn get(&self, chunk_id: &str) -> Option<UpsertRecord> {
        self.records.lock().get(chunk_id).cloned()
    }
}

#[async_trait]
impl VectorStore for FakeVectorStore {
    fn name(&self) -> &str {
        "fake"
    }

    async fn upsert(&self, records: Vec<UpsertRecord>) -> Result<(), AdapterError> {
        let mut store = self.records.lock();
        for record in records {
            store.insert(record.chunk_id.clone(), record);
        }
        Ok(())
    }

    async fn exists(&self, chunk_id: &str) -> Result<bool, AdapterError> {
        Ok(self.records.lock().contains_key(chunk_id))
    }

    async fn dimension(&self) -> Result<Option<usize>, AdapterError> {
        Ok(self.records.lock().values().next().map(|r| r.vector.len()))
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>, AdapterError> {
        let mut scored: Vec<ScoredChunk> = self
            .records
            .lock()
            .values()
            .map(|r| ScoredChunk {
                chunk_id: r.chunk_id.clone(),
                score: cosine_similarity(vector, &r.vector),
                metadata: r.metadata.clone(),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        Ok(scored)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
