// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Background submission of parsed records
//!
//! The [`Sender`] drains the record queue in batches, converts each record to
//! its wire form and hands the batch to a [`BatchSink`]. Delivery is best
//! effort: a batch that fails to submit is logged and dropped, and the loop
//! carries on. Nothing is retried.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::queue::RecordConsumer;
use crate::wire::WireRecord;

/// Path of the batch endpoint, relative to the API base URL
pub const BATCH_PATH: &str = "api/tests/batch";

/// Timeout for a single batch request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default upper bound on records per batch
pub const DEFAULT_BATCH_SIZE: usize = 100;

// ============================================================================
// Error Types
// ============================================================================

/// Failure to submit one batch
#[derive(Debug, Error)]
pub enum SendError {
    /// HTTP transport error or non-success response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize the batch
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to write the batch to the local sink
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// Sinks
// ============================================================================

/// Destination for batches of wire records
#[async_trait]
pub trait BatchSink: Send + Sync {
    /// Deliver one batch
    ///
    /// # Errors
    ///
    /// Returns `SendError` if the batch could not be delivered.
    async fn submit(&self, batch: &[WireRecord]) -> Result<(), SendError>;
}

/// Posts batches to the results API
#[derive(Debug)]
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
}

impl HttpSink {
    /// Create a sink posting to `url`, normally `Config::batch_url`
    ///
    /// # Errors
    ///
    /// Returns `SendError::Http` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, SendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Full URL batches are posted to
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BatchSink for HttpSink {
    async fn submit(&self, batch: &[WireRecord]) -> Result<(), SendError> {
        self.client
            .post(&self.url)
            .json(batch)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Writes batches as pretty-printed JSON, for runs without an API endpoint
pub struct WriterSink<W> {
    out: Mutex<W>,
}

impl WriterSink<io::Stdout> {
    /// A sink writing to standard output
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> WriterSink<W> {
    /// Wrap a writer
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> BatchSink for WriterSink<W> {
    async fn submit(&self, batch: &[WireRecord]) -> Result<(), SendError> {
        let text = serde_json::to_string_pretty(batch)?;
        let mut out = self.out.lock().await;
        writeln!(out, "{text}")?;
        out.flush()?;
        Ok(())
    }
}

// ============================================================================
// Sender
// ============================================================================

/// Counts of what the sender delivered and dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendStats {
    /// Batches the sink accepted
    pub batches_sent: usize,
    /// Batches dropped after a submission failure
    pub batches_dropped: usize,
    /// Records in accepted batches
    pub records_sent: usize,
    /// Records in dropped batches
    pub records_dropped: usize,
}

/// Drains the record queue into a sink
pub struct Sender {
    sink: Arc<dyn BatchSink>,
    prefix: String,
    batch_size: usize,
}

impl Sender {
    /// Create a sender
    ///
    /// `prefix` is prepended to every record's file name. A `batch_size` of
    /// zero is treated as one.
    #[must_use]
    pub fn new(sink: Arc<dyn BatchSink>, prefix: impl Into<String>, batch_size: usize) -> Self {
        Self {
            sink,
            prefix: prefix.into(),
            batch_size: batch_size.max(1),
        }
    }

    /// Run the loop on its own task
    pub fn spawn(self, consumer: RecordConsumer) -> JoinHandle<SendStats> {
        tokio::spawn(self.run(consumer))
    }

    /// Submit batches until the end-of-stream marker has been processed
    pub async fn run(self, mut consumer: RecordConsumer) -> SendStats {
        let mut stats = SendStats::default();

        loop {
            let batch = consumer.next_batch(self.batch_size).await;
            debug!(count = batch.records.len(), "Got records from queue");

            if !batch.records.is_empty() {
                let wire: Vec<WireRecord> = batch
                    .records
                    .iter()
                    .map(|record| WireRecord::from_raw(record, &self.prefix))
                    .collect();

                match self.sink.submit(&wire).await {
                    Ok(()) => {
                        stats.batches_sent += 1;
                        stats.records_sent += wire.len();
                    }
                    Err(e) => {
                        error!(error = %e, count = wire.len(), "Batch submission failed, dropping batch");
                        stats.batches_dropped += 1;
                        stats.records_dropped += wire.len();
                    }
                }
            }

            if batch.finished {
                break;
            }
        }

        info!(
            batches = stats.batches_sent,
            records = stats.records_sent,
            dropped = stats.records_dropped,
            "Sender finished"
        );
        stats
    }
}
