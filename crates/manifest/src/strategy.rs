// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Data-processing strategies: how a dataset's raw files become chunks ready
//! for embedding.

use serde::{Deserialize, Serialize};

use crate::filter::DirectoryFilter;

/// One parser declaration: which adapter to invoke and which file
/// extensions (without the leading dot) it claims. A strategy's `parsers`
/// is an ordered list of these (spec §3, §4.3 stage 1) — when more than one
/// rule declares the same extension, the first one in declaration order
/// wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserRule {
    pub parser: String,
    #[serde(default)]
    pub file_extensions: Vec<String>,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub chunk_size: Option<u32>,
    #[serde(default)]
    pub chunk_overlap: Option<u32>,
}

/// A metadata extractor reference, applied in declaration order after
/// parsing and before embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorRef {
    pub extractor: String,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// A named processing pipeline: how to filter, parse, and extract metadata
/// from a dataset's files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStrategy {
    #[serde(default)]
    pub filter: DirectoryFilter,
    /// Declaration order matters: `parser_for` returns the first rule whose
    /// `file_extensions` contains the queried extension.
    pub parsers: Vec<ParserRule>,
    #[serde(default)]
    pub extractors: Vec<ExtractorRef>,
}

impl ProcessingStrategy {
    /// The first-declared parser rule claiming `extension` (without leading
    /// dot), if any (spec §4.3 stage 1 "first match wins").
    pub fn parser_for(&self, extension: &str) -> Option<&ParserRule> {
        self.parsers.iter().find(|rule| rule.file_extensions.iter().any(|e| e == extension))
    }
}
