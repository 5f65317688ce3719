// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Loading and referential validation of [`ProjectManifest`] documents.

use std::path::Path;

use lf_core::ConfigError;

use crate::project::ProjectManifest;

/// Parse `yaml` into a [`ProjectManifest`] and check every cross-reference
/// it contains: each dataset must name a database and processing strategy
/// that actually exist.
pub fn load_from_str(yaml: &str) -> Result<ProjectManifest, ConfigError> {
    let manifest: ProjectManifest =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::InvalidYaml(e.to_string()))?;
    validate(&manifest)?;
    Ok(manifest)
}

/// Read and parse the manifest at `path`. Errors that aren't parse/validation
/// failures (missing file, permission denied) surface as
/// [`ConfigError::InvalidYaml`] carrying the underlying message, since the
/// manifest layer has no dedicated I/O error variant.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ProjectManifest, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::InvalidYaml(format!("reading {}: {e}", path.display())))?;
    load_from_str(&contents)
}

fn validate(manifest: &ProjectManifest) -> Result<(), ConfigError> {
    if manifest.name.is_empty() {
        return Err(ConfigError::MissingField("name".to_string()));
    }
    if manifest.namespace.as_str().is_empty() {
        return Err(ConfigError::MissingField("namespace".to_string()));
    }

    for dataset in &manifest.datasets {
        if !manifest.databases.contains_key(&dataset.database) {
            return Err(ConfigError::UnknownDatabase(dataset.database.clone()));
        }
        if !manifest.strategies.contains_key(&dataset.processing_strategy) {
            return Err(ConfigError::UnknownStrategy(dataset.processing_strategy.clone()));
        }
    }

    for (db_name, db) in &manifest.databases {
        let model_id = db.embedding_strategy.model_id();
        if !manifest.models.iter().any(|m| m.id == model_id) {
            return Err(ConfigError::DanglingDatasetReference(
                db_name.clone(),
                format!("embedding model `{model_id}`"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
namespace: acme
name: support-bot
models:
  - id: bge-small
    repo: BAAI/bge-small-en-v1.5
databases:
  docs:
    embedding_strategy: bge-small
    vector_store: sqlite
strategies:
  default:
    parsers:
      - parser: pdf
        file_extensions: [pdf]
datasets:
  - name: manuals
    database: docs
    processing_strategy: default
    paths:
      - ./manuals
"#;

    #[test]
    fn valid_manifest_parses_and_validates() {
        let manifest = load_from_str(VALID).unwrap();
        assert_eq!(manifest.scoped_name(), "acme/support-bot");
        assert_eq!(manifest.datasets.len(), 1);
    }

    #[test]
    fn dataset_referencing_unknown_database_is_rejected() {
        let yaml = VALID.replace("database: docs", "database: missing");
        let err = load_from_str(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDatabase(name) if name == "missing"));
    }

    #[test]
    fn dataset_referencing_unknown_strategy_is_rejected() {
        let yaml = VALID.replace("processing_strategy: default", "processing_strategy: missing");
        let err = load_from_str(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStrategy(name) if name == "missing"));
    }

    #[test]
    fn database_referencing_unknown_model_is_rejected() {
        let yaml = VALID.replace("embedding_strategy: bge-small", "embedding_strategy: ghost-model");
        let err = load_from_str(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::DanglingDatasetReference(..)));
    }

    #[test]
    fn invalid_yaml_surfaces_as_invalid_yaml() {
        let err = load_from_str("not: [valid").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml(_)));
    }

    #[test]
    fn empty_namespace_is_rejected() {
        let yaml = VALID.replace("namespace: acme", "namespace: \"\"");
        let err = load_from_str(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "namespace"));
    }

    #[test]
    fn missing_namespace_field_fails_to_parse() {
        let yaml = VALID.replace("namespace: acme\n", "");
        let err = load_from_str(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml(_)));
    }
}
