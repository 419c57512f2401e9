//! Consumer queue handles and bound publisher handles

use std::{sync::Arc, time::Duration};

use bytes::Bytes;

use crate::{
    error::Result,
    queue::{Delivery, SubscriberQueue},
    topic::{Metadata, SharedMessage},
};

use super::instance::Topic;

/// Consumer side of one subscription.
///
/// The transport layer drains this handle and forwards messages over its
/// own protocol. The topic keeps its own reference to the queue, so
/// dropping the handle does not unsubscribe.
#[derive(Debug)]
pub struct QueueHandle {
    topic: String,
    queue: Arc<SubscriberQueue>,
}

impl QueueHandle {
    pub(super) fn new(topic: String, queue: Arc<SubscriberQueue>) -> Self {
        Self { topic, queue }
    }

    /// Block until the next message arrives; `None` once closed and drained
    pub fn dequeue(&self) -> Option<SharedMessage> {
        self.queue.dequeue()
    }

    /// Non-blocking dequeue
    pub fn try_dequeue(&self) -> Delivery {
        self.queue.try_dequeue()
    }

    /// Dequeue with a caller-chosen deadline
    pub fn dequeue_timeout(&self, timeout: Duration) -> Delivery {
        self.queue.dequeue_timeout(timeout)
    }

    /// Drain all pending messages without blocking
    pub fn drain(&self) -> Vec<SharedMessage> {
        self.queue.drain()
    }

    /// Blocking iterator over messages, ends when the queue is closed
    pub fn messages(&self) -> impl Iterator<Item = SharedMessage> + '_ {
        std::iter::from_fn(move || self.queue.dequeue())
    }

    /// Close the queue from the consumer side.
    ///
    /// The next publish on the topic removes the subscriber, after which its
    /// id can be reused and `unsubscribe` reports `SubscriberNotFound`.
    pub fn close(&self) {
        self.queue.close();
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subscriber_id(&self) -> &str {
        self.queue.subscriber_id()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Messages this subscriber lost to drop-oldest
    pub fn dropped(&self) -> u64 {
        self.queue.dropped_count()
    }
}

/// Result of a subscribe call
#[derive(Debug)]
pub struct Subscription {
    /// Queue to drain; already holds the replayed messages at its head
    pub handle: QueueHandle,
    /// Messages primed from history, oldest first
    pub replayed: Vec<SharedMessage>,
}

impl Subscription {
    pub fn into_parts(self) -> (QueueHandle, Vec<SharedMessage>) {
        (self.handle, self.replayed)
    }
}

/// Publisher bound to one topic.
///
/// Skips the registry lookup on every call. Once the topic is deleted,
/// publishing fails with `TopicNotFound`.
#[derive(Debug, Clone)]
pub struct Publisher {
    topic: Arc<Topic>,
}

impl Publisher {
    pub(super) fn new(topic: Arc<Topic>) -> Self {
        Self { topic }
    }

    /// Publish a message to the topic, returning its sequence number
    pub fn publish(&self, payload: impl Into<Bytes>, metadata: Metadata) -> Result<u64> {
        Ok(self.topic.publish(payload.into(), metadata)?.message_id)
    }

    pub fn topic_name(&self) -> &str {
        self.topic.name()
    }

    pub fn has_subscribers(&self) -> bool {
        self.topic.subscriber_count() > 0
    }
}
