// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `lf start [flags]` — ensures `lfd` (and the services it owns) are
//! running, then prints the aggregate health banner (§6).

use std::path::Path;
use std::time::Duration;

use crate::client::Client;
use crate::exit_error::ExitError;

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum Mode {
    Native,
    Container,
    Auto,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Native => "native",
            Mode::Container => "container",
            Mode::Auto => "auto",
        }
    }
}

pub async fn handle(
    client: &Client,
    auto_start: bool,
    project_dir: &Path,
    port: u16,
    mode: Mode,
    deadline: Duration,
) -> Result<(), ExitError> {
    if !auto_start {
        return Err(ExitError::user("`start` requires --auto-start (it is what launches lfd)"));
    }
    client.ensure_running(true, project_dir, port, mode.as_str(), deadline).await?;
    client.services_start(Vec::new()).await?;

    let report = client.health().await?;
    println!("status: {:?}", report.status);
    for (name, component) in &report.components {
        let latency = component.latency_ms.map(|ms| format!(" ({ms}ms)")).unwrap_or_default();
        println!("  {name}: {:?}{latency}", component.status);
    }
    Ok(())
}
