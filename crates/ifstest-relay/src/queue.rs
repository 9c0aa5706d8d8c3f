// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Handoff queue between the parser and the sender
//!
//! An unbounded FIFO with one producer and one consumer. The producer never
//! blocks. The consumer waits for work and then drains whatever is already
//! queued, up to a limit. The end of the stream is an explicit
//! [`QueueItem::Finished`] marker, pushed once when the producer is consumed
//! by [`RecordProducer::finish`].

use ifstest_log::RawRecord;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

/// An entry in the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    /// A parsed test record
    Record(RawRecord),
    /// No more records follow
    Finished,
}

/// The consumer side is gone
#[derive(Debug, Error)]
#[error("record queue consumer has shut down")]
pub struct QueueClosed;

/// Create a connected producer/consumer pair
#[must_use]
pub fn record_queue() -> (RecordProducer, RecordConsumer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RecordProducer { tx }, RecordConsumer { rx })
}

/// Parser side of the queue
#[derive(Debug)]
pub struct RecordProducer {
    tx: mpsc::UnboundedSender<QueueItem>,
}

impl RecordProducer {
    /// Append a record
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the consumer was dropped.
    pub fn push(&self, record: RawRecord) -> Result<(), QueueClosed> {
        self.tx
            .send(QueueItem::Record(record))
            .map_err(|_| QueueClosed)
    }

    /// Append the end-of-stream marker and close the producer
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` if the consumer was dropped.
    pub fn finish(self) -> Result<(), QueueClosed> {
        self.tx.send(QueueItem::Finished).map_err(|_| QueueClosed)
    }
}

/// Records taken from the queue in one go
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Batch {
    /// Records, in queue order
    pub records: Vec<RawRecord>,
    /// Whether the end of the stream was reached with this batch
    pub finished: bool,
}

/// Sender side of the queue
#[derive(Debug)]
pub struct RecordConsumer {
    rx: mpsc::UnboundedReceiver<QueueItem>,
}

impl RecordConsumer {
    /// Wait for at least one item, then take everything queued, up to `limit`
    ///
    /// If the producer goes away without sending the finish marker the batch
    /// is reported as finished so the consumer does not wait forever.
    pub async fn next_batch(&mut self, limit: usize) -> Batch {
        let mut items = Vec::with_capacity(limit.min(64));
        let received = self.rx.recv_many(&mut items, limit.max(1)).await;
        if received == 0 {
            warn!("Record queue closed without a finish marker");
            return Batch {
                records: Vec::new(),
                finished: true,
            };
        }

        // Finished can only be the last item: the producer is consumed by it
        let finished = matches!(items.last(), Some(QueueItem::Finished));
        if finished {
            items.pop();
        }

        let records = items
            .into_iter()
            .filter_map(|item| match item {
                QueueItem::Record(record) => Some(record),
                QueueItem::Finished => None,
            })
            .collect();

        Batch { records, finished }
    }
}
