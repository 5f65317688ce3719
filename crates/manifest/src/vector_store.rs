// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Vector store configuration for a [`crate::Database`].
//!
//! Supports two forms in the manifest, same convention as the embedding
//! strategy config: a bare store-type name, or a block with options.
//!
//! Short form:
//! ```yaml
//! vector_store: sqlite
//! ```
//!
//! Block form:
//! ```yaml
//! vector_store:
//!   type: qdrant
//!   url: http://localhost:6334
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Vector store backend selection plus free-form options for that backend.
///
/// Concrete store implementations are external collaborators (see `lf-adapters`
/// and the Non-goals in §1); this type only carries enough configuration to
/// select and construct one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorStoreConfig {
    /// e.g. "sqlite", "qdrant", "memory".
    pub store_type: String,
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl VectorStoreConfig {
    pub fn new(store_type: impl Into<String>) -> Self {
        Self { store_type: store_type.into(), options: BTreeMap::new() }
    }
}

impl<'de> Deserialize<'de> for VectorStoreConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Short(String),
            Block {
                #[serde(rename = "type")]
                store_type: String,
                #[serde(flatten)]
                options: BTreeMap<String, serde_json::Value>,
            },
        }

        match Helper::deserialize(deserializer)? {
            Helper::Short(store_type) => Ok(VectorStoreConfig { store_type, options: BTreeMap::new() }),
            Helper::Block { store_type, options } => Ok(VectorStoreConfig { store_type, options }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_parses_bare_string() {
        let cfg: VectorStoreConfig = serde_yaml::from_str("sqlite").unwrap();
        assert_eq!(cfg.store_type, "sqlite");
        assert!(cfg.options.is_empty());
    }

    #[test]
    fn block_form_parses_type_and_options() {
        let yaml = "type: qdrant\nurl: http://localhost:6334\n";
        let cfg: VectorStoreConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.store_type, "qdrant");
        assert_eq!(cfg.options.get("url").unwrap(), "http://localhost:6334");
    }
}
