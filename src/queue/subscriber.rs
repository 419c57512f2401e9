//! Bounded per-subscriber delivery queue with drop-oldest overflow

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex};

use crate::{
    error::{PubSubError, Result},
    topic::SharedMessage,
};

/// Result of a non-blocking or deadline-bounded dequeue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Next message in publish order
    Message(SharedMessage),
    /// Queue is live but currently has nothing to hand out
    Empty,
    /// Queue was closed and every remaining message has been consumed
    Closed,
}

impl Delivery {
    /// Take the message out, if any
    pub fn into_message(self) -> Option<SharedMessage> {
        match self {
            Delivery::Message(message) => Some(message),
            Delivery::Empty | Delivery::Closed => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Delivery::Closed)
    }
}

/// What happened to a message handed to [`SubscriberQueue::enqueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended without evicting anything
    Enqueued,
    /// Appended after discarding the oldest queued message
    DroppedOldest,
    /// Queue is closed; the message was ignored
    Closed,
}

#[derive(Debug)]
struct QueueState {
    items: VecDeque<SharedMessage>,
    closed: bool,
}

/// Bounded FIFO owned by one subscriber.
///
/// Any number of publishers may enqueue concurrently; one consumer drains.
/// Eviction and append happen under the same lock, so the queue always
/// holds exactly the most recent `capacity` messages routed to it.
#[derive(Debug)]
pub struct SubscriberQueue {
    subscriber_id: String,
    capacity: usize,
    state: Mutex<QueueState>,
    /// Signalled on every enqueue and on close
    available: Condvar,
    enqueued: AtomicU64,
    dropped: AtomicU64,
}

impl SubscriberQueue {
    /// Create a new empty queue
    pub fn new(subscriber_id: impl Into<String>, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PubSubError::invalid_parameter(
                "capacity",
                "Queue capacity must be greater than 0",
            ));
        }

        Ok(Self {
            subscriber_id: subscriber_id.into(),
            capacity,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity.min(64)),
                closed: false,
            }),
            available: Condvar::new(),
            enqueued: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        })
    }

    pub fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a message without ever blocking.
    ///
    /// When the queue is full the oldest entry is discarded first. Eviction
    /// is only counted here; callers report it once the topic lock is gone.
    pub fn enqueue(&self, message: SharedMessage) -> EnqueueOutcome {
        let mut state = self.state.lock();
        if state.closed {
            return EnqueueOutcome::Closed;
        }

        let outcome = if state.items.len() >= self.capacity {
            state.items.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
            EnqueueOutcome::DroppedOldest
        } else {
            EnqueueOutcome::Enqueued
        };

        state.items.push_back(message);
        self.enqueued.fetch_add(1, Ordering::Relaxed);
        drop(state);

        self.available.notify_one();
        outcome
    }

    /// Block until a message is available or the queue is closed.
    ///
    /// Returns `None` only once the queue is closed and fully drained.
    pub fn dequeue(&self) -> Option<SharedMessage> {
        let mut state = self.state.lock();
        loop {
            if let Some(message) = state.items.pop_front() {
                return Some(message);
            }
            if state.closed {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Take the next message if one is queued
    pub fn try_dequeue(&self) -> Delivery {
        let mut state = self.state.lock();
        Self::take(&mut state)
    }

    /// Wait at most `timeout` for a message
    pub fn dequeue_timeout(&self, timeout: Duration) -> Delivery {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        loop {
            match Self::take(&mut state) {
                Delivery::Empty => {}
                delivery => return delivery,
            }

            if self.available.wait_until(&mut state, deadline).timed_out() {
                return Self::take(&mut state);
            }
        }
    }

    /// Remove and return everything currently queued
    pub fn drain(&self) -> Vec<SharedMessage> {
        let mut state = self.state.lock();
        state.items.drain(..).collect()
    }

    /// Mark the queue closed and wake every waiting consumer.
    ///
    /// Messages already queued stay available to `dequeue`; later enqueues
    /// are ignored. Closing twice is a no-op.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);

        self.available.notify_all();
    }

    /// Close the queue and throw away whatever is still queued
    pub fn discard(&self) -> usize {
        let mut state = self.state.lock();
        state.closed = true;
        let discarded = state.items.len();
        state.items.clear();
        drop(state);

        self.available.notify_all();
        discarded
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of messages currently queued
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Total messages accepted (including ones later evicted)
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Total messages evicted by drop-oldest
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn take(state: &mut QueueState) -> Delivery {
        match state.items.pop_front() {
            Some(message) => Delivery::Message(message),
            None if state.closed => Delivery::Closed,
            None => Delivery::Empty,
        }
    }
}
