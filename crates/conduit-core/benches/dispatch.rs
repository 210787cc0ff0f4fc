//! Dispatch and join benchmarks for conduit-core.

use conduit_core::{join, ConnHandler, Events, LifecycleEvent, Message, Namespaces};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn events_with(count: usize) -> Events<()> {
    (0..count).fold(Events::new(), |events, i| {
        events.on(format!("event:{}", i), |_conn, _msg| Ok(()))
    })
}

fn bench_fire_event(c: &mut Criterion) {
    let events = events_with(64)
        .on_lifecycle(LifecycleEvent::Connect, |_conn, _msg| Ok(()));
    let hit = Message::new("", "event:32");
    let miss = Message::new("", "unknown");

    let mut group = c.benchmark_group("fire_event");
    group.bench_function("hit", |b| {
        b.iter(|| events.fire_event(black_box(&()), black_box(&hit)))
    });
    group.bench_function("miss", |b| {
        b.iter(|| events.fire_event(black_box(&()), black_box(&miss)))
    });
    group.bench_function("connect_hook", |b| {
        b.iter(|| events.fire_connect(black_box(&()), black_box(&hit)))
    });
    group.finish();
}

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("join");

    for namespaces in [1usize, 16, 128] {
        let handlers: Vec<ConnHandler<()>> = (0..namespaces)
            .map(|i| {
                Namespaces::new()
                    .namespace(format!("/ns-{}", i), events_with(8))
                    .into()
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(namespaces),
            &handlers,
            |b, handlers| b.iter(|| join(black_box(handlers))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_fire_event, bench_join);
criterion_main!(benches);
