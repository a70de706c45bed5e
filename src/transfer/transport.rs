//! Upload transports for the frame-extraction service.
//!
//! Both adapters speak the same one-shot protocol: POST a multipart body
//! with the file under the `video` field and hand back either the binary
//! frame or a classified error. They differ only in whether intermediate
//! progress is ever reported.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

use crate::common::{AppConfig, TransportMode};
use crate::consts::{ACCEPTED_MIME, EXTRACT_PATH, UPLOAD_FIELD};
use crate::errors::TransferError;
use crate::transfer::state::{FileCandidate, FileSource};

/// Fallback when an error response carries no parseable body.
const FALLBACK_SERVICE_MESSAGE: &str = "Failed to extract frame";

/// Chunk size used when an in-memory source is streamed.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Events a transport reports back to the controller.
#[derive(Debug)]
pub enum TransferEvent {
    /// Upload progress, 0-100. Buffered transports never send it.
    Progress(u8),
    /// 2xx response carrying the extracted frame.
    Completed(Bytes),
    /// Terminal failure, already classified.
    Failed(TransferError),
}

/// One-way event channel from a transport to the controller.
pub type EventSink = mpsc::UnboundedSender<TransferEvent>;

/// A single upload-and-extract request/response cycle.
///
/// Implementations emit zero or more `Progress` events followed by exactly
/// one terminal event. When `cancel` fires first they stop silently; the
/// controller already holds the terminal state at that point.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, candidate: FileCandidate, events: EventSink, cancel: CancellationToken);
}

/// `reqwest`-backed transport, streaming or buffered per configuration.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    mode: TransportMode,
}

impl HttpTransport {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            mode: config.transport,
        })
    }

    fn extract_url(&self) -> String {
        format!("{}{}", self.endpoint, EXTRACT_PATH)
    }

    async fn run(
        &self,
        candidate: FileCandidate,
        events: &EventSink,
    ) -> std::result::Result<Bytes, TransferError> {
        let part = match self.mode {
            TransportMode::Streaming => streaming_part(&candidate, events.clone()).await?,
            TransportMode::Buffered => buffered_part(&candidate).await?,
        };
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(self.extract_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        if status.is_success() && !body.is_empty() {
            return Ok(body);
        }

        Err(TransferError::Service {
            status: status.as_u16(),
            message: service_error_message(&body),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, candidate: FileCandidate, events: EventSink, cancel: CancellationToken) {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("upload aborted by cancellation token");
                return;
            }
            outcome = self.run(candidate, &events) => outcome,
        };

        let event = match outcome {
            Ok(body) => TransferEvent::Completed(body),
            Err(err) => TransferEvent::Failed(err),
        };
        let _ = events.send(event);
    }
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    error: String,
}

/// Extracts `{"error": "..."}` from a failure body, falling back to the
/// generic message when absent or malformed.
fn service_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ServiceErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| FALLBACK_SERVICE_MESSAGE.to_string())
}

/// Multipart part fed from a byte-counting stream so upload progress can be
/// observed as the body drains.
async fn streaming_part(
    candidate: &FileCandidate,
    events: EventSink,
) -> std::result::Result<reqwest::multipart::Part, TransferError> {
    let total = candidate.size;
    let stream = source_stream(&candidate.source).await?;
    let counted = count_bytes(stream, total, events);

    let part = reqwest::multipart::Part::stream_with_length(
        reqwest::Body::wrap_stream(counted),
        total,
    )
    .file_name(candidate.name.clone())
    .mime_str(ACCEPTED_MIME)
    .map_err(|e| TransferError::Network(e.to_string()))?;

    Ok(part)
}

/// Multipart part from a fully buffered read; no intermediate progress.
async fn buffered_part(
    candidate: &FileCandidate,
) -> std::result::Result<reqwest::multipart::Part, TransferError> {
    let bytes = match &candidate.source {
        FileSource::Path(path) => tokio::fs::read(path)
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?,
        FileSource::Bytes(bytes) => bytes.to_vec(),
    };

    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(candidate.name.clone())
        .mime_str(ACCEPTED_MIME)
        .map_err(|e| TransferError::Network(e.to_string()))?;

    Ok(part)
}

async fn source_stream(
    source: &FileSource,
) -> std::result::Result<
    std::pin::Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>,
    TransferError,
> {
    match source {
        FileSource::Path(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| TransferError::Network(e.to_string()))?;
            Ok(Box::pin(ReaderStream::new(file)))
        }
        FileSource::Bytes(bytes) => {
            let chunks: Vec<std::io::Result<Bytes>> = bytes
                .chunks(STREAM_CHUNK_SIZE)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect();
            Ok(Box::pin(futures::stream::iter(chunks)))
        }
    }
}

/// Wraps a byte stream so each drained chunk emits a rounded percentage.
fn count_bytes(
    stream: std::pin::Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>,
    total: u64,
    events: EventSink,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send {
    let mut sent: u64 = 0;
    stream.map(move |chunk| {
        if let Ok(bytes) = &chunk {
            sent += bytes.len() as u64;
            let _ = events.send(TransferEvent::Progress(percent(sent, total)));
        }
        chunk
    })
}

fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = ((sent as f64 / total as f64) * 100.0).round() as u64;
    pct.min(100) as u8
}
