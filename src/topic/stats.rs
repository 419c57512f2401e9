//! Topic statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Live per-topic counters, updated without the topic lock
#[derive(Debug, Default)]
pub struct TopicStats {
    /// Total messages published
    pub messages_published: AtomicU64,
    /// Copies handed to subscriber queues by publish fan-out
    pub messages_delivered: AtomicU64,
    /// Queued messages evicted by drop-oldest
    pub messages_dropped: AtomicU64,
    /// Messages copied into new queues at subscribe time
    pub messages_replayed: AtomicU64,
}

impl TopicStats {
    /// Record one publish
    pub fn record_published(&self) {
        self.messages_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch of queue deliveries and the evictions they caused
    pub fn record_delivered(&self, delivered: u64, dropped: u64) {
        self.messages_delivered.fetch_add(delivered, Ordering::Relaxed);
        if dropped > 0 {
            self.messages_dropped.fetch_add(dropped, Ordering::Relaxed);
        }
    }

    /// Record a replay into a fresh queue
    pub fn record_replayed(&self, replayed: u64) {
        self.messages_replayed.fetch_add(replayed, Ordering::Relaxed);
    }

    pub fn published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.messages_delivered.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.messages_dropped.load(Ordering::Relaxed)
    }

    pub fn replayed(&self) -> u64 {
        self.messages_replayed.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of one topic, as returned by `ListTopics`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicInfo {
    pub name: String,
    pub subscriber_count: usize,
    /// Messages currently held by the replay ring buffer
    pub buffered_count: usize,
    pub ring_capacity: usize,
    pub messages_published: u64,
    pub messages_dropped: u64,
}
