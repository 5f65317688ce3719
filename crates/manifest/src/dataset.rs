// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Dataset declarations: a named collection of source paths bound to a
//! database and a processing strategy.

use serde::{Deserialize, Serialize};

/// A named dataset: where its files live, which database its chunks land
/// in, and which processing strategy turns files into chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub database: String,
    pub processing_strategy: String,
    /// Filesystem paths or `file://` URLs; see `lf-storage` for URL-form
    /// path normalization rules.
    pub paths: Vec<String>,
}
