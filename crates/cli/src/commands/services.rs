// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `lf services status [--json]` — a direct render of `Orchestrator::status()`.

use crate::client::Client;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

pub async fn status(client: &Client, format: OutputFormat) -> Result<(), ExitError> {
    let entries = client.services_status().await?;
    format_or_json(format, &entries, || {
        for entry in &entries {
            let pid = entry.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
            let port = entry.port.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
            println!(
                "{:<10} state={:<9} health={:<10} pid={:<8} port={:<6} uptime={}s",
                entry.service_id, entry.state, format!("{:?}", entry.health), pid, port, entry.uptime_secs
            );
        }
    })
    .map_err(ExitError::from)
}
