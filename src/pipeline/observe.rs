use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::collector::{CollectorError, ReceiveError};
use crate::models::{GroupRef, PipelineEvent, PipelineGroupEvents};

/// Bounded queue collector that can be drained by polling or consumed by several
/// receivers at once.
///
/// Clones share the same queue, so a clone can be handed to each producer thread.
/// Producers block while the queue is full. Closing wakes them with
/// [`CollectorError::Closed`].
#[derive(Debug, Clone)]
pub struct ObservePipeCollector {
    queue_tx: Sender<PipelineGroupEvents>,
    queue_rx: Receiver<PipelineGroupEvents>,
    // Never sent on. Dropping the sender disconnects `closed_rx`, which is the close signal.
    closer: Arc<Mutex<Option<Sender<()>>>>,
    closed_rx: Receiver<()>,
    capacity: usize,
}

impl ObservePipeCollector {
    pub fn new(queue_size: usize) -> Self {
        let (queue_tx, queue_rx) = bounded(queue_size);
        let (close_tx, closed_rx) = bounded(0);
        debug!(queue_size, "observable collector created");
        Self {
            queue_tx,
            queue_rx,
            closer: Arc::new(Mutex::new(Some(close_tx))),
            closed_rx,
            capacity: queue_size,
        }
    }

    /// Enqueues `events` as one batch for `group`, blocking while the queue is full.
    pub fn collect(&self, group: &GroupRef, events: Vec<PipelineEvent>) -> Result<(), CollectorError> {
        if events.is_empty() {
            return Ok(());
        }
        self.push(PipelineGroupEvents::new(group.clone(), events))
    }

    /// Enqueues each batch on its own, in order. Stops at the first rejected batch.
    pub fn collect_list(&self, groups: Vec<PipelineGroupEvents>) -> Result<(), CollectorError> {
        for batch in groups {
            if batch.is_empty() {
                continue;
            }
            self.push(batch)?;
        }
        Ok(())
    }

    fn push(&self, batch: PipelineGroupEvents) -> Result<(), CollectorError> {
        if self.is_closed() {
            warn!(events = batch.len(), "collect on closed observable collector");
            return Err(CollectorError::Closed);
        }
        select! {
            send(self.queue_tx, batch) -> res => res.map_err(|_| CollectorError::Closed),
            recv(self.closed_rx) -> _ => {
                warn!("observable collector closed while producer was blocked");
                Err(CollectorError::Closed)
            }
        }
    }

    /// Drains the batches buffered at the time of the call.
    ///
    /// The count is read once up front. Batches enqueued after that stay in the queue for the
    /// next drain, and batches taken by a concurrent consumer shorten the result.
    pub fn to_array(&self) -> Vec<PipelineGroupEvents> {
        let pending = self.queue_rx.len();
        let mut results = Vec::with_capacity(pending);
        for _ in 0..pending {
            match self.queue_rx.try_recv() {
                Ok(batch) => results.push(batch),
                Err(_) => break,
            }
        }
        trace!(pending, drained = results.len(), "observable collector drained");
        results
    }

    pub fn observe(&self) -> GroupEventsReceiver {
        GroupEventsReceiver {
            queue_rx: self.queue_rx.clone(),
            closed_rx: self.closed_rx.clone(),
        }
    }

    pub fn close(&self) {
        if self.closer.lock().take().is_some() {
            debug!(buffered = self.queue_rx.len(), "observable collector closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.closed_rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    pub fn len(&self) -> usize {
        self.queue_rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue_rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Consuming end of an [`ObservePipeCollector`].
///
/// Clones compete for batches and each batch is delivered to exactly one of them.
/// After the collector is closed, receivers yield what is still buffered and then `None`.
#[derive(Debug, Clone)]
pub struct GroupEventsReceiver {
    queue_rx: Receiver<PipelineGroupEvents>,
    closed_rx: Receiver<()>,
}

impl GroupEventsReceiver {
    /// Blocks until a batch arrives, or returns `None` once the collector is closed and empty.
    pub fn recv(&self) -> Option<PipelineGroupEvents> {
        select! {
            recv(self.queue_rx) -> batch => batch.ok(),
            recv(self.closed_rx) -> _ => self.queue_rx.try_recv().ok(),
        }
    }

    pub fn try_recv(&self) -> Option<PipelineGroupEvents> {
        self.queue_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<PipelineGroupEvents, ReceiveError> {
        select! {
            recv(self.queue_rx) -> batch => batch.map_err(|_| ReceiveError::Closed),
            recv(self.closed_rx) -> _ => self.queue_rx.try_recv().map_err(|_| ReceiveError::Closed),
            default(timeout) => Err(ReceiveError::Timeout),
        }
    }
}

impl Iterator for GroupEventsReceiver {
    type Item = PipelineGroupEvents;

    fn next(&mut self) -> Option<PipelineGroupEvents> {
        self.recv()
    }
}
