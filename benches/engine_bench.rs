use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pubsub_engine::{
    EngineConfigBuilder, Message, Metadata, RingBuffer, SubscriberQueue, TopicRegistry,
};
use std::{sync::Arc, thread};

fn registry(queue_capacity: usize) -> TopicRegistry {
    let config = EngineConfigBuilder::new()
        .queue_capacity(queue_capacity)
        .build()
        .unwrap();
    TopicRegistry::new(config).unwrap()
}

fn benchmark_publish_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("Publish_FanOut");

    for subscribers in [0usize, 1, 8, 64].iter() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            subscribers,
            |b, &subscribers| {
                let registry = registry(1024);
                registry.create_topic("bench").unwrap();
                let subscriptions: Vec<_> = (0..subscribers)
                    .map(|i| registry.subscribe("bench", &format!("sub-{}", i), 0).unwrap())
                    .collect();

                // Queues stay full, so this measures the drop-oldest path too
                b.iter(|| {
                    registry
                        .publish("bench", &b"payload"[..], Metadata::new())
                        .unwrap()
                });

                drop(subscriptions);
            },
        );
    }

    group.finish();
}

fn benchmark_ring_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("RingBuffer");

    for capacity in [100usize, 1024, 16384].iter() {
        group.throughput(Throughput::Elements(*capacity as u64));
        group.bench_with_input(
            BenchmarkId::new("push_wrap", capacity),
            capacity,
            |b, &capacity| {
                let mut ring: RingBuffer<u64> = RingBuffer::new(capacity).unwrap();
                b.iter(|| {
                    for i in 0..capacity as u64 {
                        ring.push(i);
                    }
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("last_n", capacity), capacity, |b, &capacity| {
            let mut ring: RingBuffer<u64> = RingBuffer::new(capacity).unwrap();
            for i in 0..(capacity * 2) as u64 {
                ring.push(i);
            }
            b.iter(|| ring.last_n(capacity / 2));
        });
    }

    group.finish();
}

fn benchmark_queue_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("SubscriberQueue_Contention");
    let per_producer = 10_000u64;

    for producers in [1usize, 2, 4].iter() {
        group.throughput(Throughput::Elements(per_producer * *producers as u64));
        group.bench_with_input(
            BenchmarkId::new("producers", producers),
            producers,
            |b, &producers| {
                let message = Arc::new(Message::new(1, "bench", "payload".into(), Metadata::new()));

                b.iter(|| {
                    let queue = Arc::new(SubscriberQueue::new("bench", 1024).unwrap());
                    let handles: Vec<_> = (0..producers)
                        .map(|_| {
                            let queue = queue.clone();
                            let message = message.clone();
                            thread::spawn(move || {
                                for _ in 0..per_producer {
                                    queue.enqueue(message.clone());
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                    queue.len()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_publish_fan_out,
    benchmark_ring_buffer,
    benchmark_queue_contention
);
criterion_main!(benches);
