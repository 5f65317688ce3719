// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Shared text/JSON rendering. Every command picks one of these instead of
//! `println!`-ing ad hoc, so `--json` behaves identically everywhere.

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn format_or_json<T: Serialize>(
    format: OutputFormat,
    data: &T,
    text_fn: impl FnOnce(),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => text_fn(),
    }
    Ok(())
}

/// Renders a wire `ErrorPayload`'s `recovery` list verbatim (§7 "User-visible
/// failure behavior": "The CLI and UI render `recovery` verbatim").
pub fn print_recovery(recovery: &[String]) {
    if recovery.is_empty() {
        return;
    }
    eprintln!("\nTry:");
    for cmd in recovery {
        eprintln!("  {cmd}");
    }
}
