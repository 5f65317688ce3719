// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `lf chat [msg]` — streams a response from the Universal Runtime (§6,
//! §9 "Universal Runtime ... just an HTTP dependency"). Unlike
//! `datasets`/`rag`, chat never goes through the broker: it's a direct,
//! stateless-per-request HTTP call to whichever runtime instance
//! `services status` reports, the way §1 describes the runtime as a plain
//! HTTP dependency of the core rather than a task the broker dispatches.

use futures_util::StreamExt;

use crate::client::Client;
use crate::exit_error::ExitError;

pub async fn handle(
    client: &Client,
    msg: Option<String>,
    curl: bool,
    session_id: Option<String>,
) -> Result<(), ExitError> {
    let message = msg.unwrap_or_default();
    let runtime_url = runtime_base_url(client).await?;
    let endpoint = format!("{runtime_url}/v1/chat/completions");
    let body = serde_json::json!({
        "messages": [{"role": "user", "content": message}],
        "stream": true,
        "session_id": session_id,
    });

    if curl {
        println!(
            "curl -N -H 'content-type: application/json' -d '{}' {}",
            serde_json::to_string(&body).unwrap_or_default(),
            endpoint
        );
        return Ok(());
    }

    let http = reqwest::Client::new();
    let resp = http
        .post(&endpoint)
        .json(&body)
        .send()
        .await
        .map_err(|e| ExitError::service(format!("could not reach the Universal Runtime: {e}")))?;

    if !resp.status().is_success() {
        return Err(ExitError::service(format!("runtime returned {}", resp.status())));
    }

    let mut stream = resp.bytes_stream();
    let mut buf = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ExitError::service(format!("stream error: {e}")))?;
        buf.push_str(&String::from_utf8_lossy(&chunk));
        while let Some(pos) = buf.find("\n\n") {
            let line = buf[..pos].to_string();
            buf.drain(..pos + 2);
            print_sse_line(&line);
        }
    }
    println!();
    Ok(())
}

fn print_sse_line(line: &str) {
    let Some(data) = line.strip_prefix("data: ") else { return };
    if data.trim() == "[DONE]" {
        return;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(data) {
        if let Some(token) = value.pointer("/choices/0/delta/content").and_then(|v| v.as_str()) {
            print!("{token}");
            use std::io::Write;
            let _ = std::io::stdout().flush();
        }
    }
}

async fn runtime_base_url(client: &Client) -> Result<String, ExitError> {
    let entries = client.services_status().await?;
    let runtime = entries
        .into_iter()
        .find(|e| e.service_id == "runtime")
        .ok_or_else(|| ExitError::service("the Universal Runtime is not running (run `lf start`)"))?;
    let port = runtime.port.ok_or_else(|| ExitError::service("runtime has no known port"))?;
    Ok(format!("http://127.0.0.1:{port}"))
}
