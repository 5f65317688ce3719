// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Model-download streamer (§4.4 "Model-download streamer"): proxies a
//! HuggingFace-style download and streams [`DownloadEvent`]s. Dropping the
//! returned stream aborts the download at the next chunk boundary — there
//! is no separate cancel call, closing the receiver is the signal.

use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use lf_wire::DownloadEvent;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

const CHANNEL_CAPACITY: usize = 16;

/// Default download timeout (§4.4 "Cancellation and timeouts").
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub struct DownloadRequest {
    pub model_id: String,
    pub quantization: Option<String>,
    pub url: String,
    pub destination: PathBuf,
}

impl DownloadRequest {
    fn desc(&self) -> String {
        match &self.quantization {
            Some(q) => format!("{}:{}", self.model_id, q),
            None => self.model_id.clone(),
        }
    }
}

pub fn stream_download(http: reqwest::Client, request: DownloadRequest) -> ReceiverStream<DownloadEvent> {
    stream_download_with_timeout(http, request, DEFAULT_TIMEOUT)
}

pub fn stream_download_with_timeout(
    http: reqwest::Client,
    request: DownloadRequest,
    timeout: Duration,
) -> ReceiverStream<DownloadEvent> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(run_download(http, request, timeout, tx));
    ReceiverStream::new(rx)
}

async fn run_download(
    http: reqwest::Client,
    request: DownloadRequest,
    timeout: Duration,
    tx: mpsc::Sender<DownloadEvent>,
) {
    let desc = request.desc();

    let response = match tokio::time::timeout(timeout, http.get(&request.url).send()).await {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => return send_network_error(&tx, e.to_string()).await,
        Err(_) => return send_network_error(&tx, "download timed out waiting for a response").await,
    };

    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => return send_network_error(&tx, e.to_string()).await,
    };

    let total = response.content_length().unwrap_or(0);
    if tx.send(DownloadEvent::Start { desc: desc.clone(), total }).await.is_err() {
        return;
    }

    if let Some(parent) = request.destination.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            let _ = tx.send(DownloadEvent::Error { message: format!("parse error: cannot prepare destination directory: {e}") }).await;
            return;
        }
    }
    let mut file = match tokio::fs::File::create(&request.destination).await {
        Ok(f) => f,
        Err(e) => {
            let _ = tx.send(DownloadEvent::Error { message: format!("parse error: cannot open destination file: {e}") }).await;
            return;
        }
    };

    let mut body = response.bytes_stream();
    let mut downloaded: u64 = 0;

    loop {
        let next = match tokio::time::timeout(timeout, body.next()).await {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(e))) => {
                let _ = tx.send(DownloadEvent::Error { message: format!("parse error: malformed response body: {e}") }).await;
                return;
            }
            Ok(None) => break,
            Err(_) => return send_network_error(&tx, "download timed out mid-transfer").await,
        };

        if let Err(e) = file.write_all(&next).await {
            let _ = tx.send(DownloadEvent::Error { message: format!("parse error: failed writing destination: {e}") }).await;
            return;
        }

        downloaded += next.len() as u64;
        if tx.send(DownloadEvent::Progress { n: downloaded, total }).await.is_err() {
            return;
        }
    }

    if tx.send(DownloadEvent::End { desc }).await.is_err() {
        return;
    }
    let _ = tx.send(DownloadEvent::Done { local_dir: request.destination.display().to_string() }).await;
}

async fn send_network_error(tx: &mpsc::Sender<DownloadEvent>, detail: impl std::fmt::Display) {
    let _ = tx.send(DownloadEvent::Error { message: format!("network error: {detail}") }).await;
}
