// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! RAG database declarations: the pairing of an embedding strategy, a
//! retrieval strategy, and a vector store that together answer `rag query`.

use serde::{Deserialize, Serialize};

use crate::vector_store::VectorStoreConfig;

/// Which embedding model/strategy a database uses to turn chunks into
/// vectors. Short form names a model id already declared under `models`;
/// block form allows per-database overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingStrategy {
    ModelId(String),
    Explicit {
        model_id: String,
        #[serde(default)]
        dimensions: Option<u32>,
    },
}

impl EmbeddingStrategy {
    pub fn model_id(&self) -> &str {
        match self {
            EmbeddingStrategy::ModelId(id) => id,
            EmbeddingStrategy::Explicit { model_id, .. } => model_id,
        }
    }
}

/// How `rag query` should retrieve and rank chunks for this database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalStrategy {
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default)]
    pub rerank: bool,
}

impl Default for RetrievalStrategy {
    fn default() -> Self {
        Self { top_k: default_top_k(), rerank: false }
    }
}

fn default_top_k() -> u32 {
    5
}

/// A single named RAG database: embedding strategy, retrieval strategy, and
/// vector store, bound together. Datasets reference a database by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub embedding_strategy: EmbeddingStrategy,
    #[serde(default)]
    pub retrieval_strategy: RetrievalStrategy,
    pub vector_store: VectorStoreConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_strategy_short_form_is_model_id() {
        let strategy: EmbeddingStrategy = serde_yaml::from_str("\"bge-small\"").unwrap();
        assert_eq!(strategy.model_id(), "bge-small");
    }

    #[test]
    fn retrieval_strategy_defaults_top_k_to_five() {
        assert_eq!(RetrievalStrategy::default().top_k, 5);
    }
}
