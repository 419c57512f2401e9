//! Basic usage example of the pub/sub engine

use pubsub_engine::{Delivery, EngineConfigBuilder, Metadata, Result, TopicRegistry};
use std::{thread, time::Duration};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    println!("Pub/Sub Engine Example");
    println!("======================");

    // Small ring so replay is easy to see
    let config = EngineConfigBuilder::new()
        .ring_capacity(5)
        .queue_capacity(64)
        .build()?;
    let registry = TopicRegistry::new(config)?;

    registry.create_topic("events")?;
    println!("Created topic 'events'");

    // A live consumer draining on its own thread
    let live = registry.subscribe("events", "consumer-1", 0)?;
    let consumer = thread::spawn(move || {
        let mut seen = Vec::new();
        for message in live.handle.messages() {
            println!(
                "  consumer-1 got #{} {} (event={})",
                message.id(),
                String::from_utf8_lossy(message.payload()),
                message.metadata_value("event").unwrap_or("-")
            );
            seen.push(message.id());
        }
        seen
    });

    let publisher = registry.publisher("events")?;
    for (event, body) in [
        ("user.signup", r#"{"user_id":101}"#),
        ("order.placed", r#"{"order_id":201}"#),
        ("order.shipped", r#"{"order_id":201}"#),
    ] {
        let mut metadata = Metadata::new();
        metadata.insert("event".to_string(), event.to_string());
        let id = publisher.publish(body, metadata)?;
        println!("Published #{} ({})", id, event);
    }

    // A late subscriber asks for the last two messages
    let late = registry.subscribe("events", "consumer-2", 2)?;
    println!("\nconsumer-2 replayed {} messages:", late.replayed.len());
    for message in &late.replayed {
        println!("  #{} {}", message.id(), String::from_utf8_lossy(message.payload()));
    }

    // Draining with a deadline instead of blocking forever
    let mut drained = 0;
    while let Delivery::Message(_) = late.handle.dequeue_timeout(Duration::from_millis(50)) {
        drained += 1;
    }
    println!("consumer-2 drained {} queued messages", drained);

    println!("\nTopics:");
    for info in registry.list_topics() {
        println!(
            "  {} -> {} subscribers, {} buffered",
            info.name, info.subscriber_count, info.buffered_count
        );
    }

    // Deleting the topic closes consumer-1's queue and ends its loop
    registry.unsubscribe("events", "consumer-2")?;
    registry.delete_topic("events")?;
    let seen = consumer.join().unwrap_or_default();
    println!("\nconsumer-1 saw {:?} before the topic closed", seen);

    let stats = registry.stats();
    println!("\nEngine stats:");
    println!("  Topics: {}", stats.topic_count);
    println!("  Published: {}", stats.total_messages_published);
    println!("  Dropped: {}", stats.total_messages_dropped);

    Ok(())
}
