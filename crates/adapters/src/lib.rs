// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lf-adapters: the pluggable traits each stage of the ingestion pipeline
//! (`lf-pipeline`) is built against — `Parser`, `Extractor`, `Embedder`,
//! `VectorStore` — plus content hashing and metadata cleaning shared by
//! every concrete implementation.
//!
//! Concrete parsers/embedders/vector stores for real file formats and real
//! backends are external collaborators; this crate only defines the seams
//! and, under `test-support`, an in-memory fake of each.

mod embedder;
mod error;
mod extractor;
#[cfg(any(test, feature = "test-support"))]
mod fake;
pub mod hash;
mod metadata;
mod parser;
mod vector_store;

pub use embedder::Embedder;
pub use error::AdapterError;
pub use extractor::Extractor;
pub use metadata::{clean_metadata, MetadataValue};
pub use parser::{ParsedChunk, Parser};
pub use vector_store::{ScoredChunk, UpsertRecord, VectorStore};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeEmbedder, FakeExtractor, FakeParser, FakeVectorStore};
