// Copyright 2025 Cowboy AI, LLC.

use cim_typeguard::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn order_guard() -> cim_typeguard::ObjectGuard {
    object([
        ("id", is_string().boxed()),
        ("status", literal(["open", "paid", "shipped"]).boxed()),
        (
            "lines",
            object([("sku", is_string().boxed()), ("qty", is_number().boxed())])
                .array()
                .boxed(),
        ),
        ("note", is_string().optional().boxed()),
    ])
}

fn order(lines: usize) -> Value {
    let lines: Vec<Value> = (0..lines)
        .map(|i| Value::object([("sku", Value::from(format!("sku-{i}"))), ("qty", Value::from(i as u64))]))
        .collect();
    Value::object([
        ("id", Value::from("o-1")),
        ("status", Value::from("paid")),
        ("lines", Value::Array(lines)),
    ])
}

fn linked_list(depth: usize) -> Value {
    (0..depth).fold(Value::Null, |tail, i| {
        Value::object([("head", Value::from(i as u64)), ("tail", tail)])
    })
}

fn benchmark_object_guard(c: &mut Criterion) {
    let guard = order_guard();
    let mut group = c.benchmark_group("object_guard");

    for lines in [1, 10, 100, 1000].iter() {
        let value = order(*lines);
        group.bench_with_input(BenchmarkId::new("order", lines), &value, |b, value| {
            b.iter(|| guard.test(black_box(value)));
        });
    }

    group.finish();
}

fn benchmark_recursive_guard(c: &mut Criterion) {
    let list = recursive(|this| {
        object([
            ("head", is_number().boxed()),
            ("tail", maybe(this).boxed()),
        ])
    });
    let mut group = c.benchmark_group("recursive_guard");

    for depth in [10, 100, 500].iter() {
        let value = linked_list(*depth);
        group.bench_with_input(BenchmarkId::new("list", depth), &value, |b, value| {
            b.iter(|| list.test(black_box(value)));
        });
    }

    group.finish();
}

fn benchmark_union_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("union_width");

    for width in [2, 16, 128].iter() {
        let guard = union((0..*width).map(|i| literal([i]).boxed()));
        let miss = Value::from(-1);
        group.bench_with_input(BenchmarkId::new("miss", width), &miss, |b, value| {
            b.iter(|| guard.test(black_box(value)));
        });
    }

    group.finish();
}

fn benchmark_schema_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema_projection");

    group.bench_function("fresh", |b| {
        b.iter(|| order_guard().schema().map(|schema| schema.document().clone()));
    });

    let cached = order_guard();
    group.bench_function("cached", |b| {
        b.iter(|| cached.schema());
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_object_guard,
    benchmark_recursive_guard,
    benchmark_union_width,
    benchmark_schema_projection
);
criterion_main!(benches);
