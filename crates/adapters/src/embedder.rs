// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Embedders: `list<text> -> list<vector>` (§4.3 stage 5). All vectors a
//! single database produces MUST have identical dimension; the pipeline
//! treats a mismatch as a [`lf_core::DependencyError::DimensionMismatch`].

use async_trait::async_trait;

use crate::error::AdapterError;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Fixed output dimension this embedder produces, when known in
    /// advance (some remote embedders only reveal it after the first call).
    fn dimension(&self) -> Option<usize>;

    /// Embed a batch of texts. The returned vector has exactly one entry
    /// per input text, in the same order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AdapterError>;
}
