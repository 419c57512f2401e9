use clap::{App, Arg, ArgMatches, SubCommand};
use pubsub_engine::{
    config::{DEFAULT_QUEUE_CAPACITY, DEFAULT_RING_CAPACITY},
    EngineConfig, EngineConfigBuilder, Metadata, PubSubError, Result, TopicRegistry,
};
use std::{
    sync::{Arc, Barrier},
    thread,
    time::Instant,
};

fn main() -> Result<()> {
    env_logger::init();

    let defaults_help = format!(
        "Defaults: ring capacity {}, queue capacity {}",
        DEFAULT_RING_CAPACITY, DEFAULT_QUEUE_CAPACITY
    );

    let ring_arg = Arg::with_name("ring_capacity")
        .long("ring-capacity")
        .value_name("N")
        .help("Replay ring buffer capacity per topic (overrides TOPIC_RING_BUFFER_SIZE)")
        .takes_value(true);
    let queue_arg = Arg::with_name("queue_capacity")
        .long("queue-capacity")
        .value_name("N")
        .help("Subscriber queue capacity (overrides SUBSCRIBER_QUEUE_MAX_SIZE)")
        .takes_value(true);

    let matches = App::new("pubsub-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("In-process pub/sub engine demo and stress tool")
        .after_help(defaults_help.as_str())
        .subcommand(
            SubCommand::with_name("demo")
                .about("Create a topic, subscribe, publish and drain")
                .arg(
                    Arg::with_name("topic")
                        .short("t")
                        .long("topic")
                        .value_name("TOPIC")
                        .help("Topic name")
                        .default_value("events")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("count")
                        .short("c")
                        .long("count")
                        .value_name("COUNT")
                        .help("Messages to publish")
                        .default_value("10")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("last_n")
                        .short("n")
                        .long("last-n")
                        .value_name("N")
                        .help("Replay depth for a late subscriber")
                        .default_value("5")
                        .takes_value(true),
                )
                .arg(ring_arg.clone())
                .arg(queue_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("stress")
                .about("Concurrent publishers and subscribers on one topic")
                .arg(
                    Arg::with_name("publishers")
                        .short("p")
                        .long("publishers")
                        .value_name("N")
                        .help("Publisher threads")
                        .default_value("4")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("messages")
                        .short("m")
                        .long("messages")
                        .value_name("K")
                        .help("Messages per publisher")
                        .default_value("10000")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("subscribers")
                        .short("s")
                        .long("subscribers")
                        .value_name("N")
                        .help("Subscriber threads")
                        .default_value("4")
                        .takes_value(true),
                )
                .arg(ring_arg)
                .arg(queue_arg),
        )
        .get_matches();

    match matches.subcommand() {
        ("demo", Some(demo_matches)) => run_demo(demo_matches)?,
        ("stress", Some(stress_matches)) => run_stress(stress_matches)?,
        _ => println!("Use --help for usage information"),
    }

    Ok(())
}

fn parse_arg(matches: &ArgMatches, name: &str) -> Result<usize> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| PubSubError::invalid_parameter(name, "Missing value"))?;
    raw.parse()
        .map_err(|_| PubSubError::invalid_parameter(name, format!("Invalid number: {}", raw)))
}

fn engine_config(matches: &ArgMatches) -> Result<EngineConfig> {
    let mut builder = EngineConfigBuilder::from_config(EngineConfig::from_env());
    if matches.is_present("ring_capacity") {
        builder = builder.ring_capacity(parse_arg(matches, "ring_capacity")?);
    }
    if matches.is_present("queue_capacity") {
        builder = builder.queue_capacity(parse_arg(matches, "queue_capacity")?);
    }
    builder.build()
}

fn run_demo(matches: &ArgMatches) -> Result<()> {
    let topic = matches.value_of("topic").unwrap_or("events");
    let count = parse_arg(matches, "count")?;
    let last_n = parse_arg(matches, "last_n")?;

    let registry = TopicRegistry::new(engine_config(matches)?)?;
    registry.create_topic(topic)?;

    let early = registry.subscribe(topic, "early", 0)?;
    for i in 0..count {
        let mut metadata = Metadata::new();
        metadata.insert("seq".to_string(), i.to_string());
        registry.publish(topic, format!("event {}", i), metadata)?;
    }

    let late = registry.subscribe(topic, "late", last_n)?;

    println!("Topic '{}': published {} messages", topic, count);
    println!("\nearly subscriber:");
    for message in early.handle.drain() {
        println!(
            "  #{:<4} {}",
            message.id(),
            String::from_utf8_lossy(message.payload())
        );
    }
    println!("\nlate subscriber (replayed {}):", late.replayed.len());
    for message in late.handle.drain() {
        println!(
            "  #{:<4} {}",
            message.id(),
            String::from_utf8_lossy(message.payload())
        );
    }

    println!("\nTopics:");
    for info in registry.list_topics() {
        println!(
            "  - {} (subscribers: {}, buffered: {}/{})",
            info.name, info.subscriber_count, info.buffered_count, info.ring_capacity
        );
    }

    registry.delete_topic(topic)?;
    println!(
        "\nAfter delete, early subscriber closed: {}",
        early.handle.is_closed()
    );
    print_stats(&registry);

    Ok(())
}

fn run_stress(matches: &ArgMatches) -> Result<()> {
    let publishers = parse_arg(matches, "publishers")?;
    let messages = parse_arg(matches, "messages")?;
    let subscribers = parse_arg(matches, "subscribers")?;

    let registry = Arc::new(TopicRegistry::new(engine_config(matches)?)?);
    registry.create_topic("stress")?;

    let consumers: Vec<_> = (0..subscribers)
        .map(|i| {
            let subscription = registry.subscribe("stress", &format!("consumer-{}", i), 0)?;
            Ok::<_, PubSubError>(thread::spawn(move || {
                let mut received = 0usize;
                let mut last_id = 0u64;
                let mut ordered = true;
                for message in subscription.handle.messages() {
                    ordered &= message.id() > last_id;
                    last_id = message.id();
                    received += 1;
                }
                (received, subscription.handle.dropped(), ordered)
            }))
        })
        .collect::<Result<_>>()?;

    let barrier = Arc::new(Barrier::new(publishers));
    let start = Instant::now();

    let producers: Vec<_> = (0..publishers)
        .map(|p| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || -> Result<()> {
                let publisher = registry.publisher("stress")?;
                barrier.wait();
                for i in 0..messages {
                    publisher.publish(format!("{}:{}", p, i), Metadata::new())?;
                }
                Ok(())
            })
        })
        .collect();

    for producer in producers {
        producer
            .join()
            .map_err(|_| PubSubError::invalid_parameter("publisher", "Publisher thread panicked"))??;
    }
    let elapsed = start.elapsed();

    // Closing the topic ends every consumer loop once its queue is drained
    registry.delete_topic("stress")?;

    println!(
        "Published {} messages from {} threads in {:.2}ms ({:.0} msgs/sec)",
        publishers * messages,
        publishers,
        elapsed.as_secs_f64() * 1000.0,
        (publishers * messages) as f64 / elapsed.as_secs_f64()
    );

    for (i, consumer) in consumers.into_iter().enumerate() {
        let (received, dropped, ordered) = consumer
            .join()
            .map_err(|_| PubSubError::invalid_parameter("subscriber", "Subscriber thread panicked"))?;
        println!(
            "  consumer-{}: received {}, dropped {}, ordered {}",
            i, received, dropped, ordered
        );
    }

    print_stats(&registry);
    Ok(())
}

fn print_stats(registry: &TopicRegistry) {
    let stats = registry.stats();
    let health = registry.health();

    println!("\nEngine stats:");
    println!("  Topics: {}", stats.topic_count);
    println!("  Subscribers: {}", stats.total_subscribers);
    println!("  Messages published: {}", stats.total_messages_published);
    println!("  Messages dropped: {}", stats.total_messages_dropped);
    println!("  Uptime: {:.2}s", health.uptime.as_secs_f64());
}
