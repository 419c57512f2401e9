//! Fixed-capacity overwrite-oldest ring buffer used for replay

use crate::error::{PubSubError, Result};

/// Circular store of the most recent `capacity` items, in arrival order.
///
/// Not synchronized on its own: the owning topic mutates it under its lock.
#[derive(Debug)]
pub struct RingBuffer<T> {
    /// Slot storage, grows up to `capacity` and is then reused in place
    slots: Vec<T>,
    /// Capacity (any non-zero size)
    capacity: usize,
    /// Index of the oldest item once the buffer has wrapped
    head: usize,
}

impl<T: Clone> RingBuffer<T> {
    /// Create a new ring buffer with the given capacity
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PubSubError::invalid_parameter(
                "capacity",
                "Capacity must be greater than 0",
            ));
        }

        Ok(Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        })
    }

    /// Get the capacity of the ring buffer
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the current number of elements in the buffer
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Append an item, returning the evicted oldest item when full
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.slots.len() < self.capacity {
            self.slots.push(item);
            return None;
        }

        let evicted = std::mem::replace(&mut self.slots[self.head], item);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    /// Copy out up to `n` of the most recent items, oldest first
    pub fn last_n(&self, n: usize) -> Vec<T> {
        let take = n.min(self.len());
        self.iter().skip(self.len() - take).cloned().collect()
    }

    /// Most recently appended item
    pub fn newest(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let index = (self.head + self.len() - 1) % self.len();
        self.slots.get(index)
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (wrapped, front) = self.slots.split_at(self.head);
        front.iter().chain(wrapped.iter())
    }

    /// Reset the ring buffer (clears all data)
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}
