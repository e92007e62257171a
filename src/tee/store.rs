//! Tee implementation
//!
//! The fan-out point between the single producer (the input copy loop) and
//! every connected viewer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, watch, Mutex};

use crate::error::{Error, Result};
use crate::stats::TeeStats;

use super::chunk::Chunk;
use super::config::TeeConfig;
use super::sink::{Sink, SinkId};

/// Registered sinks, keyed by id
#[derive(Debug, Default)]
struct SinkSet {
    senders: HashMap<SinkId, mpsc::Sender<Chunk>>,
    closed: bool,
}

/// What a waiting producer can observe without taking the set lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Gate {
    subscribers: usize,
    closed: bool,
}

impl Gate {
    fn is_open(&self) -> bool {
        self.subscribers > 0 || self.closed
    }
}

/// Broadcast point for one producer and any number of sinks
///
/// Every chunk written is delivered to every sink registered at the time of
/// the write, in write order. `write` waits while no sink is registered.
///
/// Lock order: the set mutex is never held across a delivery, so a consumer
/// that stalls only blocks the producer, never `subscribe`/`unsubscribe`.
#[derive(Debug)]
pub struct Tee {
    /// Subscriber set
    sinks: Mutex<SinkSet>,

    /// Mirror of the set size and closed flag for the producer to wait on
    gate: watch::Sender<Gate>,

    /// Configuration
    config: TeeConfig,

    next_sink_id: AtomicU64,
    chunks_written: AtomicU64,
    bytes_written: AtomicU64,
    deliveries: AtomicU64,
    sinks_dropped: AtomicU64,
}

impl Tee {
    /// Create a new tee with default configuration
    pub fn new() -> Self {
        Self::with_config(TeeConfig::default())
    }

    /// Create a new tee with custom configuration
    pub fn with_config(config: TeeConfig) -> Self {
        let (gate, _) = watch::channel(Gate::default());

        Self {
            sinks: Mutex::new(SinkSet::default()),
            gate,
            config,
            next_sink_id: AtomicU64::new(1),
            chunks_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            sinks_dropped: AtomicU64::new(0),
        }
    }

    /// Get the tee configuration
    pub fn config(&self) -> &TeeConfig {
        &self.config
    }

    /// Register a new sink
    ///
    /// Wakes a producer waiting for its first subscriber. The tee must not be
    /// closed; if it is, the returned sink is already terminated.
    pub async fn subscribe(&self) -> Sink {
        let id = SinkId(self.next_sink_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.config.sink_capacity);

        let mut sinks = self.sinks.lock().await;

        if sinks.closed {
            tracing::warn!(sink_id = %id, "Subscribe on closed tee, sink is terminated");
            return Sink::new(id, rx);
        }

        sinks.senders.insert(id, tx);
        self.publish_gate(&sinks);

        tracing::info!(sink_id = %id, sinks = sinks.senders.len(), "Sink subscribed");

        Sink::new(id, rx)
    }

    /// Remove a sink
    ///
    /// Tears the sink down completely: a delivery to it that is in flight
    /// fails at once and the producer moves on. Removing a sink that is no
    /// longer registered (e.g. after `close`) is a no-op.
    pub async fn unsubscribe(&self, sink: Sink) {
        let id = sink.id();

        {
            let mut sinks = self.sinks.lock().await;

            if sinks.senders.remove(&id).is_some() {
                self.publish_gate(&sinks);
                tracing::info!(sink_id = %id, sinks = sinks.senders.len(), "Sink unsubscribed");
            } else {
                tracing::debug!(sink_id = %id, "Unsubscribe of unregistered sink");
            }
        }

        drop(sink);
    }

    /// Broadcast `data` to every registered sink
    ///
    /// Waits until at least one sink is registered, copies `data` into a
    /// [`Chunk`] and hands it to each sink in turn. Each handoff waits for room
    /// in that sink, so a slow consumer delays the others and the producer.
    ///
    /// Returns `data.len()`. The only error is [`Error::Closed`] when called
    /// after [`close`](Tee::close). Empty `data` still waits for a sink but
    /// delivers nothing.
    pub async fn write(&self, data: &[u8]) -> Result<usize> {
        let targets = loop {
            self.wait_for_subscriber().await;

            let sinks = self.sinks.lock().await;
            if sinks.closed {
                return Err(Error::Closed);
            }
            // The last sink may have left between the wake-up and the lock
            if sinks.senders.is_empty() {
                continue;
            }

            break sinks
                .senders
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect::<Vec<_>>();
        };

        if data.is_empty() {
            return Ok(0);
        }

        let chunk = Chunk::copy_from_slice(data);

        tracing::debug!(bytes = data.len(), sinks = targets.len(), "Sending chunk");

        let mut delivered = 0u64;
        let mut gone = Vec::new();

        for (id, tx) in targets {
            if tx.send(chunk.clone()).await.is_ok() {
                delivered += 1;
            } else {
                gone.push(id);
            }
        }

        if !gone.is_empty() {
            self.prune(&gone).await;
        }

        self.chunks_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(data.len() as u64, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered, Ordering::Relaxed);

        Ok(data.len())
    }

    /// Terminate every registered sink
    ///
    /// Consumers read whatever was already delivered, then `None`. Must not
    /// run concurrently with `write`. Closing twice is a no-op.
    pub async fn close(&self) {
        let mut sinks = self.sinks.lock().await;

        if sinks.closed {
            tracing::debug!("Tee already closed");
            return;
        }

        sinks.closed = true;
        let count = sinks.senders.len();
        sinks.senders.clear();
        self.publish_gate(&sinks);

        tracing::info!(sinks = count, "Tee closed");
    }

    /// Number of registered sinks
    pub fn subscriber_count(&self) -> usize {
        self.gate.borrow().subscribers
    }

    /// Whether the tee has been closed
    pub fn is_closed(&self) -> bool {
        self.gate.borrow().closed
    }

    /// Get tee statistics
    pub fn stats(&self) -> TeeStats {
        let gate = *self.gate.borrow();

        TeeStats {
            subscriber_count: gate.subscribers,
            chunks_written: self.chunks_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            sinks_dropped: self.sinks_dropped.load(Ordering::Relaxed),
            closed: gate.closed,
        }
    }

    async fn wait_for_subscriber(&self) {
        let mut gate = self.gate.subscribe();

        let open = gate.borrow().is_open();
        if !open {
            tracing::debug!("No sinks, waiting for one");
        }

        // The sender lives as long as self, so this only returns once open
        let _ = gate.wait_for(Gate::is_open).await;
    }

    /// Drop sinks whose consumer went away without unsubscribing
    async fn prune(&self, ids: &[SinkId]) {
        let mut sinks = self.sinks.lock().await;

        let removed = ids
            .iter()
            .filter(|id| sinks.senders.remove(*id).is_some())
            .count();

        if removed > 0 {
            self.publish_gate(&sinks);
            self.sinks_dropped
                .fetch_add(removed as u64, Ordering::Relaxed);

            tracing::debug!(
                removed = removed,
                sinks = sinks.senders.len(),
                "Pruned sinks with no consumer"
            );
        }
    }

    fn publish_gate(&self, sinks: &SinkSet) {
        self.gate.send_replace(Gate {
            subscribers: sinks.senders.len(),
            closed: sinks.closed,
        });
    }
}

impl Default for Tee {
    fn default() -> Self {
        Self::new()
    }
}
