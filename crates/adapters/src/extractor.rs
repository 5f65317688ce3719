// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Extractors: pure functions `(text, metadata) -> additional metadata`
//! (§4.3 stage 3). Extractors MUST NOT modify text; failures are logged and
//! skipped by the pipeline, never fail the chunk.

use std::collections::BTreeMap;

use crate::error::AdapterError;

pub trait Extractor: Send + Sync {
    fn name(&self) -> &str;

    /// Derive additional metadata from `text` and the chunk's existing
    /// `metadata`. Returning `Err` causes the pipeline to log and skip this
    /// extractor for this chunk only — it never fails the chunk itself.
    fn extract(
        &self,
        text: &str,
        metadata: &BTreeMap<String, serde_json::Value>,
    ) -> Result<BTreeMap<String, serde_json::Value>, AdapterError>;
}
