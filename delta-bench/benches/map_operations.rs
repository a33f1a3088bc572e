//! Delta Benchmark Suite
//!
//! Hot paths of a running simulation:
//!   map_add_proxy_renumbered ......... insertion with `Prefix_NN` renaming
//!   map_find_proxies_wildcard ........ name / category query over 1000 actors
//!   map_remove_proxy_with_fixup ...... removal scanning every reference property
//!   proxy_populate_full_update ....... snapshot of a 20-property actor
//!   proxy_apply_filtered_update ...... inbound update through the accept list

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use delta_core::actor::{ActorPtr, BasicActor};
use delta_core::actor_type::{ActorType, ActorTypePtr};
use delta_core::map::{Map, ProxyQuery};
use delta_core::property::{ActorActorProperty, GenericProperty, PropertyValue};
use delta_game::proxy::{GameActorProxy, GameActorProxyPtr};
use delta_game::{LocalActorUpdatePolicy, Message, MessageType};

fn thing_type() -> ActorTypePtr {
    ActorType::new("Thing", "bench.things", "").with_class_name("Thing").into_ptr()
}

fn thing(name: &str) -> ActorPtr {
    BasicActor::new(thing_type(), name).into_ptr()
}

fn populated_map(count: usize) -> Map {
    let mut map = Map::new("bench.dtmap", "Bench");
    for i in 0..count {
        map.add_proxy(thing(&format!("Thing_{i:02}")), false);
    }
    map
}

fn wide_proxy(properties: usize) -> GameActorProxyPtr {
    let t = ActorType::new("Tank", "bench.vehicles", "").into_ptr();
    let mut proxy = GameActorProxy::new(t, "Tank_01");
    for i in 0..properties {
        let value = PropertyValue::Float(i as f32);
        proxy = proxy.with_property(GenericProperty::new(&format!("Prop{i}"), value).into_ptr());
    }
    proxy.into_ptr()
}

/// Benchmark: insertion with renumbering into a map of 500 actors.
fn bench_add_proxy(c: &mut Criterion) {
    c.bench_function("map_add_proxy_renumbered", |b| {
        b.iter_batched(
            || (populated_map(500), thing("Thing_01")),
            |(mut map, actor)| {
                black_box(map.add_proxy(actor, true));
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark: wildcard name plus category query over 1000 actors.
fn bench_find_proxies(c: &mut Criterion) {
    let map = populated_map(1000);
    let query = ProxyQuery::new().name("Thing_1*").category("bench");
    c.bench_function("map_find_proxies_wildcard", |b| {
        b.iter(|| black_box(map.find_proxies(black_box(&query))));
    });
}

/// Benchmark: removal of a referenced actor from a map of 200 referrers.
fn bench_remove_proxy(c: &mut Criterion) {
    c.bench_function("map_remove_proxy_with_fixup", |b| {
        b.iter_batched(
            || {
                let mut map = Map::new("bench.dtmap", "Bench");
                let target = thing("Target");
                map.add_proxy(target.clone(), false);
                for i in 0..200 {
                    let referrer = BasicActor::new(thing_type(), &format!("Ref_{i:02}"))
                        .with_property(ActorActorProperty::new("Target", "").into_ptr())
                        .into_ptr();
                    map.add_proxy(referrer, false);
                }
                (map, target)
            },
            |(mut map, target)| {
                black_box(map.remove_proxy(&target));
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark: full update snapshot of a 20-property proxy.
fn bench_populate(c: &mut Criterion) {
    let proxy = wide_proxy(20);
    c.bench_function("proxy_populate_full_update", |b| {
        b.iter(|| {
            let mut message = Message::new(MessageType::InfoActorUpdated);
            proxy.borrow().populate_actor_update(&mut message, &[]);
            black_box(message);
        });
    });
}

/// Benchmark: applying a 20-parameter update with half the names accepted.
fn bench_apply(c: &mut Criterion) {
    let source = wide_proxy(20);
    let mut message = Message::new(MessageType::InfoActorUpdated);
    source.borrow().populate_actor_update(&mut message, &[]);

    let target = wide_proxy(20);
    {
        let mut t = target.borrow_mut();
        t.set_local_actor_update_policy(LocalActorUpdatePolicy::AcceptWithPropertyFilter);
        for i in (0..20).step_by(2) {
            t.add_property_to_local_update_accept_filter(&format!("Prop{i}"));
        }
    }
    c.bench_function("proxy_apply_filtered_update", |b| {
        b.iter(|| black_box(target.borrow_mut().apply_actor_update(black_box(&message), true)));
    });
}

criterion_group!(
    benches,
    bench_add_proxy,
    bench_find_proxies,
    bench_remove_proxy,
    bench_populate,
    bench_apply,
);
criterion_main!(benches);
