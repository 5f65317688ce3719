// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! A Signature names a task without executing it — the producer (API server)
//! never imports the consumer's (worker's) handler code, only this string +
//! JSON-args pair. The consumer resolves `name` to a handler at dispatch time
//! (see `lf-broker::registry`).

use serde::{Deserialize, Serialize};

use crate::task::TaskName;

/// An unsent reference to a task: `(name, args)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub name: TaskName,
    pub args: serde_json::Value,
}

impl Signature {
    pub fn new(name: impl Into<TaskName>, args: impl Serialize) -> serde_json::Result<Self> {
        Ok(Self { name: name.into(), args: serde_json::to_value(args)? })
    }

    /// Deserialize the typed arguments this signature carries.
    pub fn args_as<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.args.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct IngestArgs {
        project_dir: String,
        database_name: String,
        source_path: String,
    }

    #[test]
    fn signature_round_trips_typed_args() {
        let args = IngestArgs {
            project_dir: "/p".into(),
            database_name: "db".into(),
            source_path: "/p/a.txt".into(),
        };
        let sig = Signature::new("rag.ingest_file", &args).unwrap();
        assert_eq!(sig.name.as_str(), "rag.ingest_file");
        assert_eq!(sig.args_as::<IngestArgs>().unwrap(), args);
    }
}
