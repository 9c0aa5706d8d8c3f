// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Run lifecycle
//!
//! Starts the sender, parses the input on a blocking task while pushing
//! records into the queue, then waits for the sender to drain.
//!
//! A fatal parse error abandons the queue: the sender task is aborted and
//! records still waiting in the queue are not submitted. Batches already
//! handed to the sink stay delivered.
//!
//! # Example
//!
//! ```no_run
//! use ifstest_relay::config::Config;
//! use ifstest_relay::driver;
//!
//! # async fn example() -> Result<(), ifstest_relay::driver::RelayError> {
//! let config = Config::default();
//! let summary = driver::run(&config).await?;
//! println!("sent {} records", summary.send.records_sent);
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;

use ifstest_log::{Event, LogError, ParseStats, RecordParser, decode_line};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{Config, ConfigError};
use crate::queue::{QueueClosed, RecordProducer, record_queue};
use crate::sender::{BatchSink, HttpSink, SendError, SendStats, Sender, WriterSink};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that end a run
#[derive(Debug, Error)]
pub enum RelayError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input could not be read or parsed
    #[error("{0}")]
    Log(#[from] LogError),

    /// The results sink could not be set up
    #[error("Sink error: {0}")]
    Sink(#[from] SendError),

    /// The sender stopped taking records
    #[error("Queue error: {0}")]
    Queue(#[from] QueueClosed),

    /// A background task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// ============================================================================
// Options and Summary
// ============================================================================

/// Settings for a single relay run
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Prepended to every record's file name
    pub prefix: String,
    /// Upper bound on records per batch
    pub batch_size: usize,
    /// Echo input lines to stdout
    pub passthrough: bool,
}

impl From<&Config> for RelayOptions {
    fn from(config: &Config) -> Self {
        Self {
            prefix: config.prefix.clone(),
            batch_size: config.batch_size(),
            passthrough: config.passthrough,
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// What the parser produced
    pub parse: ParseStats,
    /// What the sender delivered
    pub send: SendStats,
}

// ============================================================================
// Entry points
// ============================================================================

/// Run with the given configuration
///
/// Reads the configured input (or stdin) and submits to the configured API,
/// or prints to stdout when no API URL is set.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the input cannot be
/// opened or parsed, or the HTTP client cannot be built.
pub async fn run(config: &Config) -> Result<RunSummary, RelayError> {
    config.validate()?;

    let sink: Arc<dyn BatchSink> = match config.batch_url() {
        Some(url) => {
            let sink = HttpSink::new(url)?;
            info!(url = %sink.url(), "Submitting results to API");
            Arc::new(sink)
        }
        None => {
            info!("No API URL configured, printing results to stdout");
            Arc::new(WriterSink::stdout())
        }
    };

    let input: Box<dyn BufRead + Send> = match config.input_path() {
        Some(path) => {
            info!(path = %path.display(), "Reading IFSTest output");
            Box::new(BufReader::new(File::open(path).map_err(LogError::from)?))
        }
        None => {
            info!("Reading IFSTest output from stdin");
            Box::new(BufReader::new(io::stdin()))
        }
    };

    relay(input, sink, RelayOptions::from(config)).await
}

/// Parse `input` and deliver its records to `sink`
///
/// # Errors
///
/// Returns `RelayError::Log` on a read or parse failure; the sender is
/// aborted in that case.
pub async fn relay<R>(
    input: R,
    sink: Arc<dyn BatchSink>,
    options: RelayOptions,
) -> Result<RunSummary, RelayError>
where
    R: BufRead + Send + 'static,
{
    let (producer, consumer) = record_queue();
    let sender = Sender::new(sink, options.prefix, options.batch_size).spawn(consumer);

    let passthrough = options.passthrough;
    let parsed =
        tokio::task::spawn_blocking(move || parse_into_queue(input, producer, passthrough)).await;

    let stats = match parsed {
        Ok(Ok(stats)) => stats,
        Ok(Err(e)) => {
            error!(error = %e, "Parsing failed, abandoning queued records");
            sender.abort();
            return Err(e);
        }
        Err(e) => {
            sender.abort();
            return Err(e.into());
        }
    };

    info!(
        records = stats.records,
        skipped = stats.end_of_group,
        "Waiting for test result sending to finish"
    );

    let send = sender.await?;
    info!(
        sent = send.records_sent,
        dropped = send.records_dropped,
        "Done"
    );

    Ok(RunSummary { parse: stats, send })
}

/// Feed every line to the parser, pushing completed records
///
/// The finish marker is pushed once the parser reaches its final state.
fn parse_into_queue<R: BufRead>(
    mut input: R,
    producer: RecordProducer,
    passthrough: bool,
) -> Result<ParseStats, RelayError> {
    let mut parser = RecordParser::new();
    let mut raw = Vec::new();
    let mut echo = io::stdout();

    loop {
        raw.clear();
        if input.read_until(b'\n', &mut raw).map_err(LogError::from)? == 0 {
            parser.finish().map_err(LogError::from)?;
            break;
        }
        if passthrough {
            echo.write_all(&raw).map_err(LogError::from)?;
        }

        match parser.feed(&decode_line(&raw)).map_err(LogError::from)? {
            Some(Event::Record(record)) => producer.push(record)?,
            Some(Event::EndOfGroup) => debug!("Skipping end of group marker"),
            Some(Event::Finished) | None => {}
        }

        if parser.is_finished() {
            info!("Reached final state before end of input");
            break;
        }
    }

    debug!("Reached final state");
    producer.finish()?;
    Ok(parser.stats())
}
