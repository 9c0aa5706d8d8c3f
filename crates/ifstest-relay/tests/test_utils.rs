// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test utilities for ifstest-relay integration tests
//!
//! This module provides utilities for:
//! - Temporary directory management
//! - Sample IFSTest logs
//! - An in-memory batch sink
//! - A minimal local HTTP endpoint that records posted batches

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ifstest_relay::sender::{BatchSink, SendError};
use ifstest_relay::wire::WireRecord;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// ============================================================================
// Temporary Directory Management
// ============================================================================

/// Counter for generating unique test directory names
static TEST_DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A temporary directory that is automatically cleaned up when dropped
pub struct TempTestDir {
    path: PathBuf,
}

impl TempTestDir {
    /// Create a new uniquely named temporary test directory
    pub fn new(test_name: &str) -> Self {
        let counter = TEST_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir_name = format!(
            "ifstest-relay-test-{}-{}-{}",
            test_name,
            std::process::id(),
            counter
        );
        let path = std::env::temp_dir().join(dir_name);
        fs::create_dir_all(&path).expect("Failed to create temp test directory");
        Self { path }
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a file within the temp directory with the given content
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(relative_path);
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }
}

impl Drop for TempTestDir {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_dir_all(&self.path);
        }
    }
}

// ============================================================================
// Sample Logs
// ============================================================================

/// The captured IFSTest log shared with the ifstest-log tests
pub fn sample_log() -> String {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let path = Path::new(&manifest_dir)
        .parent() // crates/
        .expect("crates directory")
        .join("ifstest-log/tests/fixtures/ifstest-sample.log");
    fs::read_to_string(path).expect("Failed to read ifstest-sample.log fixture")
}

/// Build a log with the given (test name, status) blocks
pub fn log_with_blocks(blocks: &[(&str, &str)]) -> String {
    let mut log = format!("\n\n{0}\n+++IFSTest header+++\n{0}\n", "-".repeat(50));
    for (name, status) in blocks {
        log.push_str(&format!(
            "Test         :{name}\nGroup        :Generated\nStatus       :{status}\n\n"
        ));
    }
    log
}

// ============================================================================
// Sinks
// ============================================================================

/// Keeps every submitted batch in memory
#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<Vec<WireRecord>>>,
}

impl RecordingSink {
    pub fn batches(&self) -> Vec<Vec<WireRecord>> {
        self.batches.lock().expect("lock").clone()
    }

    pub fn records(&self) -> Vec<WireRecord> {
        self.batches().into_iter().flatten().collect()
    }
}

#[async_trait]
impl BatchSink for RecordingSink {
    async fn submit(&self, batch: &[WireRecord]) -> Result<(), SendError> {
        self.batches.lock().expect("lock").push(batch.to_vec());
        Ok(())
    }
}

// ============================================================================
// Local HTTP endpoint
// ============================================================================

/// A request received by [`TestEndpoint`]
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// A one-connection-at-a-time HTTP/1.1 server answering every request with
/// the configured status code
pub struct TestEndpoint {
    url: String,
    received: Arc<Mutex<Vec<ReceivedRequest>>>,
    task: JoinHandle<()>,
}

impl TestEndpoint {
    /// Bind to an ephemeral loopback port
    pub async fn start(status: u16) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test endpoint");
        let url = format!("http://{}/", listener.local_addr().expect("local addr"));
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = received.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let log = log.clone();
                tokio::spawn(async move {
                    let _ = serve_connection(stream, status, log).await;
                });
            }
        });

        Self {
            url,
            received,
            task,
        }
    }

    /// Base URL, with a trailing slash
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requests received so far
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().expect("lock").clone()
    }

    /// Every record posted so far, in arrival order
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.received()
            .iter()
            .flat_map(|r| {
                let batch: Vec<serde_json::Value> =
                    serde_json::from_str(&r.body).expect("batch body is a JSON array");
                batch
            })
            .collect()
    }
}

impl Drop for TestEndpoint {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_connection(
    stream: tokio::net::TcpStream,
    status: u16,
    log: Arc<Mutex<Vec<ReceivedRequest>>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);

    loop {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await? == 0 {
            return Ok(());
        }
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let path = parts.next().unwrap_or_default().to_string();

        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).await? == 0 {
                return Ok(());
            }
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).await?;
        log.lock().expect("lock").push(ReceivedRequest {
            method,
            path,
            body: String::from_utf8_lossy(&body).into_owned(),
        });

        let response = format!("HTTP/1.1 {status} Test\r\ncontent-length: 0\r\n\r\n");
        reader.get_mut().write_all(response.as_bytes()).await?;
        reader.get_mut().flush().await?;
    }
}
