//! Concurrent stress tests for the topic engine
//! Tests focused on ordering, publish atomicity and lock independence

use std::{
    collections::HashSet,
    sync::{Arc, Barrier},
    thread,
    time::{Duration, Instant},
};

use pubsub_engine::{EngineConfigBuilder, Metadata, TopicRegistry};

#[cfg(test)]
mod concurrent_stress_tests {
    use super::*;

    fn registry(ring: usize, queue: usize) -> Arc<TopicRegistry> {
        let config = EngineConfigBuilder::new()
            .ring_capacity(ring)
            .queue_capacity(queue)
            .build()
            .unwrap();
        Arc::new(TopicRegistry::new(config).unwrap())
    }

    /// Test: N publishers × K messages are all visible, each exactly once
    #[test]
    fn stress_concurrent_publishers_are_atomic() {
        let thread_count = 4;
        let per_thread = 500;
        let total = thread_count * per_thread;

        let registry = registry(total, total);
        registry.create_topic("stress").unwrap();
        let subscription = registry.subscribe("stress", "observer", 0).unwrap();

        let barrier = Arc::new(Barrier::new(thread_count));
        let handles: Vec<_> = (0..thread_count)
            .map(|t| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait(); // Synchronized start for maximum contention
                    for i in 0..per_thread {
                        let mut metadata = Metadata::new();
                        metadata.insert("publisher".to_string(), t.to_string());
                        metadata.insert("index".to_string(), i.to_string());
                        registry
                            .publish("stress", format!("{}:{}", t, i), metadata)
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let topic = registry.get_topic("stress").unwrap();
        let buffered = topic.last_n(total);
        assert_eq!(buffered.len(), total);

        // Sequence numbers are exactly 1..=N×K in ring order
        let ids: Vec<u64> = buffered.iter().map(|m| m.id()).collect();
        assert_eq!(ids, (1..=total as u64).collect::<Vec<_>>());

        // Every payload is intact and agrees with its metadata
        let mut seen = HashSet::new();
        for message in &buffered {
            let expected = format!(
                "{}:{}",
                message.metadata_value("publisher").unwrap(),
                message.metadata_value("index").unwrap()
            );
            assert_eq!(message.payload().as_ref(), expected.as_bytes());
            assert!(seen.insert(expected));
        }

        // Each publisher's own messages keep their relative order
        let delivered = subscription.handle.drain();
        assert_eq!(delivered.len(), total);
        for t in 0..thread_count {
            let indices: Vec<usize> = delivered
                .iter()
                .filter(|m| m.metadata_value("publisher") == Some(t.to_string().as_str()))
                .map(|m| m.metadata_value("index").unwrap().parse().unwrap())
                .collect();
            assert_eq!(indices, (0..per_thread).collect::<Vec<_>>());
        }

        assert_eq!(registry.stats().total_messages_published, total as u64);
    }

    /// Test: every subscriber sees strictly increasing ids, even while dropping
    #[test]
    fn stress_per_subscriber_order_under_overflow() {
        let publishers = 4;
        let per_publisher = 2_000;
        let consumers = 3;

        // Small queues force drop-oldest while consumers race publishers
        let registry = registry(100, 32);
        registry.create_topic("ordered").unwrap();

        let consumer_handles: Vec<_> = (0..consumers)
            .map(|c| {
                let subscription = registry
                    .subscribe("ordered", &format!("consumer-{}", c), 0)
                    .unwrap();
                thread::spawn(move || {
                    let mut ids = Vec::new();
                    for message in subscription.handle.messages() {
                        ids.push(message.id());
                    }
                    (ids, subscription.handle.dropped())
                })
            })
            .collect();

        let barrier = Arc::new(Barrier::new(publishers));
        let producer_handles: Vec<_> = (0..publishers)
            .map(|_| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let publisher = registry.publisher("ordered").unwrap();
                    barrier.wait();
                    for i in 0..per_publisher {
                        publisher.publish(format!("{}", i), Metadata::new()).unwrap();
                        if i % 100 == 0 {
                            thread::yield_now();
                        }
                    }
                })
            })
            .collect();

        for handle in producer_handles {
            handle.join().unwrap();
        }
        registry.delete_topic("ordered").unwrap();

        let total = (publishers * per_publisher) as u64;
        let mut total_dropped = 0;
        for handle in consumer_handles {
            let (ids, dropped) = handle.join().unwrap();
            assert!(
                ids.windows(2).all(|pair| pair[0] < pair[1]),
                "ids must be strictly increasing"
            );
            assert!(ids.iter().all(|&id| id >= 1 && id <= total));
            assert_eq!(ids.len() as u64 + dropped, total);
            total_dropped += dropped;
        }

        assert_eq!(registry.stats().total_messages_dropped, total_dropped);
    }

    /// Test: a subscribe racing with publishes misses nothing after it returns
    #[test]
    fn stress_subscribe_during_publish_has_no_gap() {
        let registry = registry(10_000, 10_000);
        registry.create_topic("racing").unwrap();

        let publisher = {
            let registry = registry.clone();
            thread::spawn(move || {
                for i in 0..5_000 {
                    registry
                        .publish("racing", format!("{}", i), Metadata::new())
                        .unwrap();
                }
            })
        };

        thread::sleep(Duration::from_millis(1));
        let subscription = registry.subscribe("racing", "joiner", 10_000).unwrap();
        publisher.join().unwrap();

        // Replay plus live delivery form one contiguous run ending at the last id
        let ids: Vec<u64> = subscription.handle.drain().iter().map(|m| m.id()).collect();
        assert!(!ids.is_empty());
        assert_eq!(ids[0], 1);
        assert_eq!(ids, (1..=5_000).collect::<Vec<u64>>());
    }

    /// Test: registry operations proceed while a topic is busy
    #[test]
    fn stress_registry_ops_alongside_publish_traffic() {
        let registry = registry(100, 64);
        registry.create_topic("busy").unwrap();
        let _subscription = registry.subscribe("busy", "reader", 0).unwrap();

        let publisher = {
            let registry = registry.clone();
            thread::spawn(move || {
                let start = Instant::now();
                let mut published = 0u64;
                while start.elapsed() < Duration::from_millis(200) {
                    registry.publish("busy", "tick", Metadata::new()).unwrap();
                    published += 1;
                }
                published
            })
        };

        for i in 0..200 {
            let name = format!("side-{}", i);
            registry.create_topic(&name).unwrap();
            assert!(registry.list_topics().len() >= 2);
            registry.delete_topic(&name).unwrap();
        }

        let published = publisher.join().unwrap();
        assert_eq!(registry.topic_count(), 1);
        assert_eq!(registry.topic_info("busy").unwrap().messages_published, published);
    }

    /// Test: concurrent subscribe/unsubscribe churn never corrupts the map
    #[test]
    fn stress_subscription_churn() {
        let registry = registry(50, 16);
        registry.create_topic("churn").unwrap();

        let thread_count = 4;
        let barrier = Arc::new(Barrier::new(thread_count + 1));

        let churners: Vec<_> = (0..thread_count)
            .map(|t| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..100 {
                        let id = format!("churn-{}-{}", t, i);
                        let subscription = registry.subscribe("churn", &id, 5).unwrap();
                        assert!(subscription.replayed.len() <= 5);
                        registry.unsubscribe("churn", &id).unwrap();
                        assert!(subscription.handle.is_closed());
                    }
                })
            })
            .collect();

        barrier.wait();
        for _ in 0..1_000 {
            registry.publish("churn", "x", Metadata::new()).unwrap();
        }

        for handle in churners {
            handle.join().unwrap();
        }

        let info = registry.topic_info("churn").unwrap();
        assert_eq!(info.subscriber_count, 0);
        assert_eq!(info.messages_published, 1_000);
        assert_eq!(info.buffered_count, 50);
    }
}
