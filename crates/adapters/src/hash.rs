// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Content hashing for deduplication identity (§3, §4.3): `document_hash`
//! is the content hash of the source bytes; `chunk_id` is
//! `H(document_hash || chunk_index)`.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `bytes`.
pub fn document_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hex-encoded SHA-256 of `document_hash || chunk_index`, unique within a
/// single vector store collection as long as `document_hash` is.
pub fn chunk_id(document_hash: &str, chunk_index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_hash.as_bytes());
    hasher.update(chunk_index.to_le_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_hash_is_deterministic() {
        assert_eq!(document_hash(b"hello"), document_hash(b"hello"));
    }

    #[test]
    fn document_hash_differs_for_different_content() {
        assert_ne!(document_hash(b"hello"), document_hash(b"world"));
    }

    #[test]
    fn chunk_id_differs_by_index() {
        let doc = document_hash(b"hello");
        assert_ne!(chunk_id(&doc, 0), chunk_id(&doc, 1));
    }

    #[test]
    fn chunk_id_is_stable_for_same_inputs() {
        let doc = document_hash(b"hello");
        assert_eq!(chunk_id(&doc, 3), chunk_id(&doc, 3));
    }
}
