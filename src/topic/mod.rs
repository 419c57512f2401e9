//! Topic-level building blocks: configuration, messages and statistics
//!
//! The topic engine itself (locking, fan-out, replay) lives in
//! [`crate::registry`]; this module holds the plain data it works with.

pub mod config;
pub mod message;
pub mod stats;


// Re-export main types for convenience
pub use config::{EngineConfig, EngineConfigBuilder, TopicConfig};
pub use message::{Message, Metadata, SharedMessage};
pub use stats::{TopicInfo, TopicStats};
