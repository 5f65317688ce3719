// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lf-manifest: parses and validates the project manifest (`manifest.yaml`) —
//! the YAML document that names a project's runtime model(s), prompt set, RAG
//! databases, data-processing strategies, and datasets.
//!
//! Schema-level validation (JSON-schema style constraints, code generation
//! from the manifest) lives in the Designer UI and is out of scope here; this
//! crate only has to parse the document and check the referential invariants
//! called out in §3/§7 of the orchestration spec (every database references a
//! real embedding/retrieval strategy and vector store; every dataset
//! references a real database and processing strategy).

mod database;
mod dataset;
mod filter;
mod model;
mod parse;
mod project;
mod strategy;
mod vector_store;

pub use database::{Database, EmbeddingStrategy, RetrievalStrategy};
pub use dataset::Dataset;
pub use filter::{DirectoryFilter, SymlinkPolicy};
pub use model::{Model, PromptSet};
pub use parse::{load_from_path, load_from_str};
pub use project::{Namespace, ProjectManifest};
pub use strategy::{ExtractorRef, ParserRule, ProcessingStrategy};
pub use vector_store::VectorStoreConfig;

pub use lf_core::ConfigError;
