//! Process-wide topic registry

use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
    time::Instant,
};

use bytes::Bytes;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    error::{PubSubError, Result},
    topic::{EngineConfig, Metadata, TopicConfig, TopicInfo},
};

use super::{
    handles::{Publisher, Subscription},
    instance::Topic,
    stats::{EngineStats, HealthReport, RegistryStats},
};

/// Map from topic name to topic, plus engine-wide statistics.
///
/// The registry lock only covers lookups and changes to the map itself. It
/// is always released before a topic is touched, so create/delete/list
/// never wait on publish or subscribe traffic.
#[derive(Debug)]
pub struct TopicRegistry {
    /// Map of topic name to topic instance
    topics: RwLock<HashMap<String, Arc<Topic>>>,
    config: EngineConfig,
    stats: Arc<RegistryStats>,
    started_at: Instant,
}

impl TopicRegistry {
    /// Create a registry with the given configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            topics: RwLock::new(HashMap::new()),
            config,
            stats: Arc::new(RegistryStats::new()),
            started_at: Instant::now(),
        })
    }

    /// Create a registry configured from `TOPIC_RING_BUFFER_SIZE` / `SUBSCRIBER_QUEUE_MAX_SIZE`
    pub fn from_env() -> Result<Self> {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a topic with the engine's default capacities
    pub fn create_topic(&self, name: &str) -> Result<()> {
        self.create_topic_with(name, self.config.topic)
    }

    /// Create a topic with its own capacities
    pub fn create_topic_with(&self, name: &str, config: TopicConfig) -> Result<()> {
        self.config.validate_topic_name(name)?;
        let topic = Arc::new(Topic::with_engine_stats(name, config, self.stats.clone())?);

        match self.topics.write().entry(name.to_string()) {
            Entry::Occupied(_) => return Err(PubSubError::topic_exists(name)),
            Entry::Vacant(slot) => {
                slot.insert(topic);
            }
        }

        self.stats.record_topic_created();
        log::info!(
            "Created topic {} (ring {}, queue {})",
            name,
            config.ring_capacity,
            config.queue_capacity
        );
        Ok(())
    }

    /// Remove a topic and close every subscriber queue attached to it
    pub fn delete_topic(&self, name: &str) -> Result<()> {
        let topic = self
            .topics
            .write()
            .remove(name)
            .ok_or_else(|| PubSubError::topic_not_found(name))?;

        let closed = topic.close();
        self.stats.record_topic_deleted();
        log::info!("Deleted topic {} ({} subscribers closed)", name, closed);
        Ok(())
    }

    /// Look up an existing topic
    pub fn get_topic(&self, name: &str) -> Result<Arc<Topic>> {
        self.topics
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PubSubError::topic_not_found(name))
    }

    /// Look up a topic, creating it with default capacities if missing
    pub fn ensure_topic(&self, name: &str) -> Result<Arc<Topic>> {
        if let Some(topic) = self.topics.read().get(name) {
            return Ok(topic.clone());
        }

        self.config.validate_topic_name(name)?;
        let mut topics = self.topics.write();
        let topic = match topics.entry(name.to_string()) {
            Entry::Occupied(slot) => slot.get().clone(),
            Entry::Vacant(slot) => {
                let topic = Arc::new(Topic::with_engine_stats(
                    name,
                    self.config.topic,
                    self.stats.clone(),
                )?);
                slot.insert(topic.clone());
                self.stats.record_topic_created();
                log::info!("Created topic {} on first use", name);
                topic
            }
        };

        Ok(topic)
    }

    /// Publish to a topic, returning the assigned sequence number
    pub fn publish(&self, topic: &str, payload: impl Into<Bytes>, metadata: Metadata) -> Result<u64> {
        let receipt = self.resolve(topic)?.publish(payload.into(), metadata)?;
        Ok(receipt.message_id)
    }

    /// Subscribe `subscriber_id` to a topic, replaying up to `last_n` messages
    pub fn subscribe(&self, topic: &str, subscriber_id: &str, last_n: usize) -> Result<Subscription> {
        if subscriber_id.is_empty() {
            return Err(PubSubError::invalid_parameter(
                "subscriber_id",
                "Subscriber id is required",
            ));
        }

        self.resolve(topic)?.subscribe(subscriber_id, last_n)
    }

    /// Subscribe under a generated `sub_xxxxxxxx` id
    pub fn subscribe_anonymous(&self, topic: &str, last_n: usize) -> Result<Subscription> {
        let simple = Uuid::new_v4().simple().to_string();
        let subscriber_id = format!("sub_{}", &simple[..8]);
        self.subscribe(topic, &subscriber_id, last_n)
    }

    /// Remove a subscriber from a topic
    pub fn unsubscribe(&self, topic: &str, subscriber_id: &str) -> Result<()> {
        self.get_topic(topic)?.unsubscribe(subscriber_id)
    }

    /// Publisher handle bound to an existing topic
    pub fn publisher(&self, topic: &str) -> Result<Publisher> {
        Ok(Publisher::new(self.resolve(topic)?))
    }

    /// Snapshot of every topic, sorted by name
    pub fn list_topics(&self) -> Vec<TopicInfo> {
        let mut infos: Vec<_> = self.snapshot().iter().map(|topic| topic.info()).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Snapshot of one topic
    pub fn topic_info(&self, name: &str) -> Result<TopicInfo> {
        Ok(self.get_topic(name)?.info())
    }

    /// Engine-wide totals
    pub fn stats(&self) -> EngineStats {
        let topics = self.snapshot();

        EngineStats {
            topic_count: topics.len(),
            total_subscribers: topics.iter().map(|topic| topic.subscriber_count()).sum(),
            total_messages_published: self.stats.total_published(),
            total_messages_dropped: self.stats.total_dropped(),
            topics_created: self.stats.created(),
            topics_deleted: self.stats.deleted(),
        }
    }

    /// Uptime and current sizes
    pub fn health(&self) -> HealthReport {
        let topics = self.snapshot();

        HealthReport {
            uptime: self.started_at.elapsed(),
            topics: topics.len(),
            subscribers: topics.iter().map(|topic| topic.subscriber_count()).sum(),
        }
    }

    /// Check if a topic exists
    pub fn has_topic(&self, name: &str) -> bool {
        self.topics.read().contains_key(name)
    }

    /// Get topic count
    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }

    /// Registry counters (shared with every topic)
    pub fn registry_stats(&self) -> &RegistryStats {
        &self.stats
    }

    fn resolve(&self, name: &str) -> Result<Arc<Topic>> {
        if self.config.auto_create_topics {
            self.ensure_topic(name)
        } else {
            self.get_topic(name)
        }
    }

    /// Clone the topic list so the registry lock is released before any
    /// topic lock is taken
    fn snapshot(&self) -> Vec<Arc<Topic>> {
        self.topics.read().values().cloned().collect()
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            config: EngineConfig::default(),
            stats: Arc::new(RegistryStats::new()),
            started_at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::EngineConfigBuilder;

    #[test]
    fn test_registry_creation() {
        let registry = TopicRegistry::default();
        assert_eq!(registry.topic_count(), 0);
        assert_eq!(registry.stats().topic_count, 0);
        assert!(registry.list_topics().is_empty());
    }

    #[test]
    fn test_create_validates_name() {
        let registry = TopicRegistry::default();

        assert!(matches!(
            registry.create_topic(""),
            Err(PubSubError::InvalidParameter { .. })
        ));
        assert!(matches!(
            registry.create_topic(&"x".repeat(256)),
            Err(PubSubError::InvalidParameter { .. })
        ));
        assert!(registry.create_topic(&"x".repeat(255)).is_ok());
    }

    #[test]
    fn test_create_rejects_bad_topic_config() {
        let registry = TopicRegistry::default();
        let config = TopicConfig::default().with_queue_capacity(0);

        assert!(registry.create_topic_with("orders", config).is_err());
        assert!(!registry.has_topic("orders"));
    }

    #[test]
    fn test_auto_create_on_publish_and_subscribe() {
        let config = EngineConfigBuilder::new()
            .auto_create_topics(true)
            .build()
            .unwrap();
        let registry = TopicRegistry::new(config).unwrap();

        assert_eq!(registry.publish("implicit", "hello", Metadata::new()).unwrap(), 1);
        let subscription = registry.subscribe("other", "sub", 0).unwrap();

        assert!(registry.has_topic("implicit"));
        assert!(registry.has_topic("other"));
        assert_eq!(subscription.handle.topic(), "other");
        assert_eq!(registry.stats().topics_created, 2);

        // Unsubscribe never creates
        assert!(registry.unsubscribe("ghost", "sub").unwrap_err().is_topic_not_found());
    }

    #[test]
    fn test_subscribe_requires_id() {
        let registry = TopicRegistry::default();
        registry.create_topic("orders").unwrap();

        assert!(matches!(
            registry.subscribe("orders", "", 0),
            Err(PubSubError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_anonymous_subscriber_ids() {
        let registry = TopicRegistry::default();
        registry.create_topic("orders").unwrap();

        let first = registry.subscribe_anonymous("orders", 0).unwrap();
        let second = registry.subscribe_anonymous("orders", 0).unwrap();

        let id = first.handle.subscriber_id();
        assert!(id.starts_with("sub_"));
        assert_eq!(id.len(), 12);
        assert_ne!(id, second.handle.subscriber_id());
        assert_eq!(registry.stats().total_subscribers, 2);
    }
}
