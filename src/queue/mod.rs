//! Per-subscriber delivery queues

pub mod subscriber;

pub use subscriber::{Delivery, EnqueueOutcome, SubscriberQueue};
