//! # pubsub-engine - In-Process Publish/Subscribe Topic Engine
//!
//! Producers publish messages into named topics; every consumer gets its own
//! ordered, bounded feed of those messages, optionally primed with a replay
//! of recent history.
//!
//! ## Features
//!
//! - **Named topics**: explicit create/delete lifecycle, or auto-create on first use
//! - **Per-topic replay**: fixed-capacity ring buffer of recent messages
//! - **Bounded subscriber queues**: drop-oldest overflow, producers never block
//! - **Two-level locking**: registry lock for the topic map, one lock per topic
//! - **Statistics**: per-topic and engine-wide counters, health snapshot
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                TopicRegistry                    │
//! │        name → Topic   (registry lock)           │
//! └─────────────────────────────────────────────────┘
//!           │                         │
//!           ▼                         ▼
//! ┌─────────────────────┐   ┌─────────────────────┐
//! │  Topic  (own lock)  │   │  Topic  (own lock)  │
//! │  - RingBuffer       │   │  - RingBuffer       │
//! │  - SubscriberQueues │   │  - SubscriberQueues │
//! └─────────────────────┘   └─────────────────────┘
//!           │ fan-out
//!           ▼
//! ┌─────────────────────┐
//! │  QueueHandle        │  ← drained by the transport layer
//! └─────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use pubsub_engine::{Metadata, TopicRegistry};
//!
//! let registry = TopicRegistry::default();
//! registry.create_topic("orders")?;
//!
//! let subscription = registry.subscribe("orders", "billing", 0)?;
//! let id = registry.publish("orders", "order #1", Metadata::new())?;
//!
//! let message = subscription.handle.dequeue().expect("queue is open");
//! assert_eq!(message.id(), id);
//! # Ok::<(), pubsub_engine::PubSubError>(())
//! ```

pub mod error;
pub mod queue;
pub mod registry;
pub mod ringbuf;
pub mod topic;

// Main API re-exports
pub use error::{PubSubError, Result};
pub use queue::{Delivery, EnqueueOutcome, SubscriberQueue};
pub use registry::{
    EngineStats, HealthReport, PublishReceipt, Publisher, QueueHandle, RegistryStats,
    Subscription, Topic, TopicRegistry,
};
pub use ringbuf::RingBuffer;
pub use topic::{
    EngineConfig, EngineConfigBuilder, Message, Metadata, SharedMessage, TopicConfig, TopicInfo,
    TopicStats,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration constants
pub mod config {
    /// Default replay ring buffer capacity per topic
    pub const DEFAULT_RING_CAPACITY: usize = 100;

    /// Default bound of each subscriber queue
    pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

    /// Maximum topic name length
    pub const MAX_TOPIC_NAME_LENGTH: usize = 255;

    /// Environment variable overriding [`DEFAULT_RING_CAPACITY`]
    pub const RING_CAPACITY_ENV: &str = "TOPIC_RING_BUFFER_SIZE";

    /// Environment variable overriding [`DEFAULT_QUEUE_CAPACITY`]
    pub const QUEUE_CAPACITY_ENV: &str = "SUBSCRIBER_QUEUE_MAX_SIZE";
}
