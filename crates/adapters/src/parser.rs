// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Parsers: pure functions `bytes -> ordered list of (text, per-chunk metadata)`
//! (§4.3 stage 2). Determinism for a fixed input is the only contract; the
//! pipeline does not prescribe chunking algorithms.

use std::collections::BTreeMap;

use crate::error::AdapterError;

/// One chunk of parsed text plus whatever per-chunk metadata the parser
/// produced (e.g. page number, heading path).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedChunk {
    pub text: String,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ParsedChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), metadata: BTreeMap::new() }
    }
}

/// A pure, deterministic `bytes -> chunks` transform for one file format.
pub trait Parser: Send + Sync {
    /// The parser's own name, for error messages and configuration lookup.
    fn name(&self) -> &str;

    /// Parse `bytes` into an ordered list of chunks. Must be deterministic:
    /// the same bytes always produce the same chunk sequence.
    fn parse(&self, bytes: &[u8]) -> Result<Vec<ParsedChunk>, AdapterError>;
}
