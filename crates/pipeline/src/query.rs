// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `rag.query(database_name, query, k) -> list<hit>` (§6 "Task names").
//! Embeds the query text with the same embedder configured for the
//! database, then asks the vector store for its nearest neighbors.

use std::collections::BTreeMap;

use lf_adapters::MetadataValue;
use lf_manifest::ProjectManifest;
use lf_wire::Hit;

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::CHUNK_TEXT_METADATA_KEY;

pub struct QueryArgs {
    pub database_name: String,
    pub query: String,
    pub k: u32,
}

pub async fn run_query(
    ctx: &PipelineContext,
    manifest: &ProjectManifest,
    args: &QueryArgs,
) -> Result<Vec<Hit>, PipelineError> {
    manifest
        .databases
        .get(&args.database_name)
        .ok_or_else(|| PipelineError::UnknownDatabase(args.database_name.clone()))?;
    let embedder = ctx
        .embedder(&args.database_name)
        .ok_or_else(|| PipelineError::UnknownDatabase(args.database_name.clone()))?;
    let vector_store = ctx
        .vector_store(&args.database_name)
        .ok_or_else(|| PipelineError::UnknownDatabase(args.database_name.clone()))?;

    let vectors = embedder.embed(std::slice::from_ref(&args.query)).await?;
    let vector = vectors
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::VectorStoreUnreachable("embedder returned no vector".to_string()))?;

    let matches = vector_store.query(&vector, args.k.max(1) as usize).await?;
    Ok(matches
        .into_iter()
        .map(|m| {
            let mut metadata = m.metadata;
            let text = take_text(&mut metadata);
            Hit { chunk_id: m.chunk_id, score: m.score, text, metadata: metadata_to_json_map(metadata) }
        })
        .collect())
}

fn take_text(metadata: &mut BTreeMap<String, MetadataValue>) -> String {
    match metadata.remove(CHUNK_TEXT_METADATA_KEY) {
        Some(MetadataValue::String(s)) => s,
        _ => String::new(),
    }
}

fn metadata_to_json_map(metadata: BTreeMap<String, MetadataValue>) -> serde_json::Map<String, serde_json::Value> {
    metadata.into_iter().map(|(k, v)| (k, metadata_value_to_json(v))).collect()
}

fn metadata_value_to_json(value: MetadataValue) -> serde_json::Value {
    match value {
        MetadataValue::String(s) => serde_json::Value::String(s),
        MetadataValue::Integer(i) => serde_json::Value::Number(i.into()),
        MetadataValue::Float(f) => {
            serde_json::Number::from_f64(f).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null)
        }
        MetadataValue::Boolean(b) => serde_json::Value::Bool(b),
    }
}
