//! Topic and engine configuration

use crate::{
    config::{
        DEFAULT_QUEUE_CAPACITY, DEFAULT_RING_CAPACITY, MAX_TOPIC_NAME_LENGTH, QUEUE_CAPACITY_ENV,
        RING_CAPACITY_ENV,
    },
    error::{PubSubError, Result},
};

/// Per-topic capacities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicConfig {
    /// Number of recent messages kept for replay
    pub ring_capacity: usize,
    /// Bound of each subscriber queue before drop-oldest kicks in
    pub queue_capacity: usize,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            ring_capacity: DEFAULT_RING_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl TopicConfig {
    /// Set ring buffer capacity
    pub fn with_ring_capacity(mut self, capacity: usize) -> Self {
        self.ring_capacity = capacity;
        self
    }

    /// Set subscriber queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.ring_capacity == 0 {
            return Err(PubSubError::invalid_parameter(
                "ring_capacity",
                "Ring capacity cannot be zero",
            ));
        }

        if self.queue_capacity == 0 {
            return Err(PubSubError::invalid_parameter(
                "queue_capacity",
                "Queue capacity cannot be zero",
            ));
        }

        Ok(())
    }
}

/// Engine-wide configuration handed to [`crate::TopicRegistry::new`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Defaults applied to every topic created without an override
    pub topic: TopicConfig,
    /// Create unknown topics on publish/subscribe instead of rejecting them
    pub auto_create_topics: bool,
    /// Longest accepted topic name in bytes
    pub max_topic_name_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            topic: TopicConfig::default(),
            auto_create_topics: false,
            max_topic_name_length: MAX_TOPIC_NAME_LENGTH,
        }
    }
}

impl EngineConfig {
    /// Build a configuration from the process environment.
    ///
    /// Reads `TOPIC_RING_BUFFER_SIZE` and `SUBSCRIBER_QUEUE_MAX_SIZE`.
    /// Missing values keep their defaults; malformed or zero values are
    /// reported with a warning and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] but with an injectable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(capacity) = parse_capacity(RING_CAPACITY_ENV, lookup(RING_CAPACITY_ENV)) {
            config.topic.ring_capacity = capacity;
        }
        if let Some(capacity) = parse_capacity(QUEUE_CAPACITY_ENV, lookup(QUEUE_CAPACITY_ENV)) {
            config.topic.queue_capacity = capacity;
        }

        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.topic.validate()?;

        if self.max_topic_name_length == 0 {
            return Err(PubSubError::invalid_parameter(
                "max_topic_name_length",
                "Maximum topic name length cannot be zero",
            ));
        }

        Ok(())
    }

    /// Check a topic name against the configured limits
    pub fn validate_topic_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(PubSubError::invalid_parameter("name", "Topic name is required"));
        }

        if name.len() > self.max_topic_name_length {
            return Err(PubSubError::invalid_parameter(
                "name",
                format!(
                    "Topic name length {} exceeds maximum {}",
                    name.len(),
                    self.max_topic_name_length
                ),
            ));
        }

        Ok(())
    }
}

fn parse_capacity(key: &str, raw: Option<String>) -> Option<usize> {
    let raw = raw?;
    match raw.trim().parse::<usize>() {
        Ok(0) => {
            log::warn!("{} must be greater than zero, using default", key);
            None
        }
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("{}={:?} is not a valid size, using default", key, raw);
            None
        }
    }
}

/// Builder pattern for engine configuration
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Create a new builder starting from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration (e.g. [`EngineConfig::from_env`])
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Set ring buffer capacity
    pub fn ring_capacity(mut self, capacity: usize) -> Self {
        self.config.topic.ring_capacity = capacity;
        self
    }

    /// Set subscriber queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.topic.queue_capacity = capacity;
        self
    }

    /// Enable or disable implicit topic creation
    pub fn auto_create_topics(mut self, enable: bool) -> Self {
        self.config.auto_create_topics = enable;
        self
    }

    /// Set maximum topic name length
    pub fn max_topic_name_length(mut self, length: usize) -> Self {
        self.config.max_topic_name_length = length;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
