//! Topic registry and the topic engine
//!
//! [`TopicRegistry`] owns the name → [`Topic`] map; each topic owns its
//! replay ring and subscriber queues behind its own lock. Consumers get a
//! [`QueueHandle`] to drain, producers call [`TopicRegistry::publish`] or
//! hold a [`Publisher`] bound to one topic.

pub mod handles;
pub mod instance;
pub mod manager;
pub mod stats;

pub use handles::{Publisher, QueueHandle, Subscription};
pub use instance::{PublishReceipt, Topic};
pub use manager::TopicRegistry;
pub use stats::{EngineStats, HealthReport, RegistryStats};
