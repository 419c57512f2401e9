//! Message type shared between ring buffers and subscriber queues

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{PubSubError, Result};

/// String key/value pairs attached to a message by its publisher
pub type Metadata = HashMap<String, String>;

/// A message as held by the ring buffer and every queue it was fanned out to
pub type SharedMessage = Arc<Message>;

/// Immutable record produced by a single publish call.
///
/// Fields are only reachable through accessors; once a message is built it
/// is shared behind an `Arc` and no holder can change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: u64,
    topic: String,
    payload: Bytes,
    metadata: Metadata,
    timestamp: SystemTime,
    checksum: u32,
}

impl Message {
    /// Create a new message stamped with the current time
    pub fn new(id: u64, topic: impl Into<String>, payload: Bytes, metadata: Metadata) -> Self {
        let checksum = crc32fast::hash(&payload);

        Self {
            id,
            topic: topic.into(),
            payload,
            metadata,
            timestamp: SystemTime::now(),
            checksum,
        }
    }

    /// Per-topic sequence number, starting at 1
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Name of the topic the message was published to
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Look up a single metadata value
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Creation time
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Creation time in nanoseconds since the UNIX epoch
    pub fn timestamp_nanos(&self) -> u64 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64
    }

    /// CRC32 of the payload, computed at construction
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Verify the payload still matches its checksum
    pub fn verify_checksum(&self) -> bool {
        self.checksum == crc32fast::hash(&self.payload)
    }

    /// Encode the message into a self-contained frame for a transport
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a frame produced by [`Message::encode`]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let message: Message = bincode::deserialize(bytes)?;

        if !message.verify_checksum() {
            return Err(PubSubError::serialization(format!(
                "Checksum mismatch for message {} on topic {}",
                message.id, message.topic
            )));
        }

        Ok(message)
    }
}
