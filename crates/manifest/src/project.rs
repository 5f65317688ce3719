// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Project identity and the top-level manifest document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::dataset::Dataset;
use crate::model::{Model, PromptSet};
use crate::strategy::ProcessingStrategy;

/// A project is named by `(namespace, name)`. The namespace groups related
/// projects (e.g. a team or org slug); `name` must be unique within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace(pub String);

impl Namespace {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The project manifest, immutable for the duration of a run.
///
/// Every [`Database`] references an embedding strategy, a retrieval strategy,
/// and a vector store type. Every [`ProcessingStrategy`] references a
/// directory filter, an ordered list of parsers keyed by file extension, and
/// an ordered list of metadata extractors. These references are validated in
/// [`crate::parse::load_from_str`], not here — this struct only carries the
/// parsed shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub namespace: Namespace,
    pub name: String,

    #[serde(default)]
    pub models: Vec<Model>,

    #[serde(default)]
    pub prompts: Vec<PromptSet>,

    /// Keyed by database name; order-preserving so CLI listings match
    /// declaration order in the YAML document.
    #[serde(default)]
    pub databases: IndexMap<String, Database>,

    #[serde(default, rename = "processing_strategies")]
    pub strategies: IndexMap<String, ProcessingStrategy>,

    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

impl ProjectManifest {
    pub fn scoped_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}
