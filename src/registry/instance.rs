//! Single topic: replay ring, subscriber queues and the lock over both

use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::{
    error::{PubSubError, Result},
    queue::{EnqueueOutcome, SubscriberQueue},
    ringbuf::RingBuffer,
    topic::{Message, Metadata, SharedMessage, TopicConfig, TopicInfo, TopicStats},
};

use super::{
    handles::{QueueHandle, Subscription},
    stats::RegistryStats,
};

/// Outcome of one publish on a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Sequence number assigned to the message
    pub message_id: u64,
    /// Subscriber queues that accepted the message
    pub delivered: usize,
    /// Of those, how many had to evict their oldest message
    pub dropped: usize,
}

#[derive(Debug)]
struct TopicState {
    ring: RingBuffer<SharedMessage>,
    subscribers: HashMap<String, Arc<SubscriberQueue>>,
    /// Last sequence number handed out
    last_id: u64,
    /// Set once the registry has removed this topic
    deleted: bool,
}

/// Named channel owned by the registry.
///
/// Ring buffer, subscriber map and sequence counter are all guarded by one
/// mutex. Publish holds it through the fan-out loop: enqueue never blocks,
/// and holding it keeps every queue in sequence order even with racing
/// publishers.
#[derive(Debug)]
pub struct Topic {
    name: String,
    config: TopicConfig,
    state: Mutex<TopicState>,
    stats: TopicStats,
    /// Engine-wide counters this topic reports every publish into
    engine_stats: Arc<RegistryStats>,
}

impl Topic {
    /// Create a standalone topic with its own engine counters
    pub fn new(name: impl Into<String>, config: TopicConfig) -> Result<Self> {
        Self::with_engine_stats(name, config, Arc::new(RegistryStats::new()))
    }

    /// Create a topic that reports into a registry's counters
    pub(crate) fn with_engine_stats(
        name: impl Into<String>,
        config: TopicConfig,
        engine_stats: Arc<RegistryStats>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            name: name.into(),
            state: Mutex::new(TopicState {
                ring: RingBuffer::new(config.ring_capacity)?,
                subscribers: HashMap::new(),
                last_id: 0,
                deleted: false,
            }),
            config,
            stats: TopicStats::default(),
            engine_stats,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &TopicConfig {
        &self.config
    }

    pub fn stats(&self) -> &TopicStats {
        &self.stats
    }

    /// Publish a message and fan it out to every current subscriber
    pub fn publish(&self, payload: Bytes, metadata: Metadata) -> Result<PublishReceipt> {
        let mut state = self.state.lock();
        if state.deleted {
            return Err(PubSubError::topic_not_found(&self.name));
        }

        state.last_id += 1;
        let message = Arc::new(Message::new(state.last_id, &self.name, payload, metadata));
        state.ring.push(message.clone());

        let mut receipt = PublishReceipt {
            message_id: message.id(),
            delivered: 0,
            dropped: 0,
        };

        let mut closed = Vec::new();
        for (subscriber_id, queue) in state.subscribers.iter() {
            match queue.enqueue(message.clone()) {
                EnqueueOutcome::Enqueued => receipt.delivered += 1,
                EnqueueOutcome::DroppedOldest => {
                    receipt.delivered += 1;
                    receipt.dropped += 1;
                }
                EnqueueOutcome::Closed => closed.push(subscriber_id.clone()),
            }
        }
        // Queues closed by their consumer leave the fan-out set
        for subscriber_id in &closed {
            state.subscribers.remove(subscriber_id);
        }
        drop(state);

        self.stats.record_published();
        self.stats
            .record_delivered(receipt.delivered as u64, receipt.dropped as u64);
        self.engine_stats.record_publish(&receipt);

        log::debug!(
            "Published message {} on {} to {} subscribers",
            receipt.message_id,
            self.name,
            receipt.delivered
        );
        if receipt.dropped > 0 {
            log::debug!(
                "Message {} on {} evicted the oldest entry of {} full queues",
                receipt.message_id,
                self.name,
                receipt.dropped
            );
        }
        for subscriber_id in &closed {
            log::info!("Pruned closed subscriber {} from {}", subscriber_id, self.name);
        }

        Ok(receipt)
    }

    /// Register a new subscriber queue, primed with up to `last_n` recent messages.
    ///
    /// Queue creation, replay and registration happen under one lock
    /// acquisition, so no publish can fall between replay and live delivery.
    pub fn subscribe(&self, subscriber_id: &str, last_n: usize) -> Result<Subscription> {
        let mut state = self.state.lock();
        if state.deleted {
            return Err(PubSubError::topic_not_found(&self.name));
        }
        if state.subscribers.contains_key(subscriber_id) {
            return Err(PubSubError::subscriber_exists(&self.name, subscriber_id));
        }

        let queue = Arc::new(SubscriberQueue::new(subscriber_id, self.config.queue_capacity)?);

        // Replay never exceeds the queue bound, so priming cannot evict
        let replayed = state.ring.last_n(last_n.min(self.config.queue_capacity));
        for message in &replayed {
            queue.enqueue(message.clone());
        }

        state
            .subscribers
            .insert(subscriber_id.to_string(), queue.clone());
        let subscriber_count = state.subscribers.len();
        drop(state);

        self.stats.record_replayed(replayed.len() as u64);

        log::info!(
            "Subscriber {} joined {} (replayed {}, {} subscribers)",
            subscriber_id,
            self.name,
            replayed.len(),
            subscriber_count
        );

        Ok(Subscription {
            handle: QueueHandle::new(self.name.clone(), queue),
            replayed,
        })
    }

    /// Remove a subscriber and discard its queue
    pub fn unsubscribe(&self, subscriber_id: &str) -> Result<()> {
        let queue = {
            let mut state = self.state.lock();
            if state.deleted {
                return Err(PubSubError::topic_not_found(&self.name));
            }
            state
                .subscribers
                .remove(subscriber_id)
                .ok_or_else(|| PubSubError::subscriber_not_found(&self.name, subscriber_id))?
        };

        let discarded = queue.discard();
        log::info!(
            "Subscriber {} left {} ({} pending messages discarded)",
            subscriber_id,
            self.name,
            discarded
        );

        Ok(())
    }

    /// Mark the topic deleted and close every subscriber queue.
    ///
    /// Returns the number of queues closed. Consumers can still drain what
    /// was queued before observing the terminal state.
    pub(crate) fn close(&self) -> usize {
        let queues: Vec<_> = {
            let mut state = self.state.lock();
            state.deleted = true;
            state.subscribers.drain().map(|(_, queue)| queue).collect()
        };

        for queue in &queues {
            queue.close();
        }
        queues.len()
    }

    /// Copy of the last `n` buffered messages, oldest first
    pub fn last_n(&self, n: usize) -> Vec<SharedMessage> {
        self.state.lock().ring.last_n(n)
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.state.lock().subscribers.contains_key(subscriber_id)
    }

    /// Ids of the current subscribers, sorted
    pub fn subscriber_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.state.lock().subscribers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Messages currently held for replay
    pub fn buffered_count(&self) -> usize {
        self.state.lock().ring.len()
    }

    pub fn is_deleted(&self) -> bool {
        self.state.lock().deleted
    }

    /// Point-in-time summary of the topic
    pub fn info(&self) -> TopicInfo {
        let (subscriber_count, buffered_count) = {
            let state = self.state.lock();
            (state.subscribers.len(), state.ring.len())
        };

        TopicInfo {
            name: self.name.clone(),
            subscriber_count,
            buffered_count,
            ring_capacity: self.config.ring_capacity,
            messages_published: self.stats.published(),
            messages_dropped: self.stats.dropped(),
        }
    }
}
