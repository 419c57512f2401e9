//! Error types and handling for the pub/sub engine

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, PubSubError>;

/// Errors returned synchronously by registry, topic and codec operations.
///
/// None of these are fatal: every variant describes a condition the caller
/// can recover from. Queue overflow is deliberately absent, it is counted
/// in the statistics instead of being reported.
#[derive(Debug, thiserror::Error)]
pub enum PubSubError {
    /// Topic is not registered (or has been deleted)
    #[error("Topic not found: {name}")]
    TopicNotFound { name: String },

    /// Topic name is already registered
    #[error("Topic already exists: {name}")]
    TopicAlreadyExists { name: String },

    /// Subscriber id is not registered on the topic
    #[error("Subscriber not found: {subscriber_id} on topic {topic}")]
    SubscriberNotFound { topic: String, subscriber_id: String },

    /// Subscriber id is already registered on the topic
    #[error("Subscriber already exists: {subscriber_id} on topic {topic}")]
    SubscriberAlreadyExists { topic: String, subscriber_id: String },

    /// Invalid parameters or configuration
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Message encoding/decoding errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl PubSubError {
    /// Create a topic not found error
    pub fn topic_not_found(name: impl Into<String>) -> Self {
        Self::TopicNotFound { name: name.into() }
    }

    /// Create a topic exists error
    pub fn topic_exists(name: impl Into<String>) -> Self {
        Self::TopicAlreadyExists { name: name.into() }
    }

    /// Create a subscriber not found error
    pub fn subscriber_not_found(topic: impl Into<String>, subscriber_id: impl Into<String>) -> Self {
        Self::SubscriberNotFound {
            topic: topic.into(),
            subscriber_id: subscriber_id.into(),
        }
    }

    /// Create a subscriber exists error
    pub fn subscriber_exists(topic: impl Into<String>, subscriber_id: impl Into<String>) -> Self {
        Self::SubscriberAlreadyExists {
            topic: topic.into(),
            subscriber_id: subscriber_id.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Whether the error means the named topic does not exist
    pub fn is_topic_not_found(&self) -> bool {
        matches!(self, Self::TopicNotFound { .. })
    }
}

impl From<bincode::Error> for PubSubError {
    fn from(err: bincode::Error) -> Self {
        Self::serialization(format!("Bincode error: {}", err))
    }
}
