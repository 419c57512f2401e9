//! Statistics for the topic registry

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use super::instance::PublishReceipt;

/// Engine-wide counters.
///
/// Kept outside the topics so totals survive topic deletion.
#[derive(Debug, Default)]
pub struct RegistryStats {
    /// Total topics created
    pub topics_created: AtomicU64,
    /// Total topics deleted
    pub topics_deleted: AtomicU64,
    /// Total messages published across all topics
    pub messages_published: AtomicU64,
    /// Total queued messages evicted by drop-oldest
    pub messages_dropped: AtomicU64,
}

impl RegistryStats {
    /// Create new statistics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_topic_created(&self) {
        self.topics_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_topic_deleted(&self) {
        self.topics_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one publish
    pub fn record_publish(&self, receipt: &PublishReceipt) {
        self.messages_published.fetch_add(1, Ordering::Relaxed);
        if receipt.dropped > 0 {
            self.messages_dropped
                .fetch_add(receipt.dropped as u64, Ordering::Relaxed);
        }
    }

    pub fn total_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }

    pub fn total_dropped(&self) -> u64 {
        self.messages_dropped.load(Ordering::Relaxed)
    }

    pub fn created(&self) -> u64 {
        self.topics_created.load(Ordering::Relaxed)
    }

    pub fn deleted(&self) -> u64 {
        self.topics_deleted.load(Ordering::Relaxed)
    }
}

/// Snapshot returned by `TopicRegistry::stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub topic_count: usize,
    pub total_subscribers: usize,
    pub total_messages_published: u64,
    pub total_messages_dropped: u64,
    pub topics_created: u64,
    pub topics_deleted: u64,
}

/// Liveness summary for health endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub uptime: Duration,
    pub topics: usize,
    pub subscribers: usize,
}
