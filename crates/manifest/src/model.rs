// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Runtime model and prompt set declarations.
//!
//! The concrete LLM/embedding implementations these reference are external
//! collaborators (the Universal Runtime); this crate only carries enough
//! configuration to name and route to them.

use serde::{Deserialize, Serialize};

/// A runtime model entry: which model the Universal Runtime should serve,
/// and under what local id the rest of the manifest refers to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    /// HuggingFace-style repo id, e.g. `org/model`.
    pub repo: String,
    #[serde(default)]
    pub quantization: Option<String>,
    #[serde(default = "default_true")]
    pub auto_start_runtime: bool,
}

fn default_true() -> bool {
    true
}

/// A named prompt/system-message bundle referenced by `chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSet {
    pub id: String,
    pub system: String,
    #[serde(default)]
    pub model_id: Option<String>,
}
