//! Performance benchmarks for simplyput-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use simplyput_engine::{
    flatten, unflatten, Document, FixedTimeSource, ListRequest, MemoryDatastore, Records,
};

fn sample_document() -> Document {
    serde_json::from_value(json!({
        "name": "Test User",
        "email": "test@example.com",
        "age": 30,
        "tags": ["admin", "staff", "beta"],
        "address": {
            "street": "1 Main St",
            "city": "Springfield",
            "geo": {"lat": 39.78, "lng": -89.65}
        }
    }))
    .unwrap()
}

fn populated(count: usize) -> Records<MemoryDatastore> {
    let records = Records::new(MemoryDatastore::new(), FixedTimeSource::new(1000));
    for i in 0..count {
        let body = serde_json::from_value(json!({"name": format!("User {}", i), "n": i})).unwrap();
        records.create("users", body).unwrap();
    }
    records
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let document = sample_document();

    group.bench_function("flatten", |b| b.iter(|| flatten(black_box(&document))));

    group.bench_function("unflatten", |b| {
        let properties = flatten(&document).unwrap();
        b.iter(|| unflatten(black_box(&properties), black_box("user_1")))
    });

    group.finish();
}

fn bench_record_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_operations");

    group.bench_function("create", |b| {
        let records = populated(0);
        b.iter(|| records.create("users", black_box(sample_document())))
    });

    group.bench_function("get", |b| {
        let records = populated(0);
        let created = records.create("users", sample_document()).unwrap();
        let id = created["_id"].as_str().unwrap().to_string();

        b.iter(|| records.get(black_box("users"), black_box(&id)))
    });

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");

    for size in [100, 1000, 10000] {
        let records = populated(size);

        group.bench_with_input(BenchmarkId::new("first_page", size), &size, |b, _| {
            let request = ListRequest::default();
            b.iter(|| records.list("users", black_box(&request)))
        });

        group.bench_with_input(BenchmarkId::new("sorted_page", size), &size, |b, _| {
            let request = ListRequest::from_pairs([("sort", "-n"), ("limit", "50")]).unwrap();
            b.iter(|| records.list("users", black_box(&request)))
        });

        group.bench_with_input(BenchmarkId::new("filtered_page", size), &size, |b, _| {
            let request = ListRequest::from_pairs([("where", "name=User 7")]).unwrap();
            b.iter(|| records.list("users", black_box(&request)))
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for size in [100, 1000] {
        let records = populated(size);
        let snapshot = records.store().export_snapshot();

        group.bench_with_input(BenchmarkId::new("export", size), &size, |b, _| {
            b.iter(|| records.store().export_snapshot())
        });

        group.bench_with_input(BenchmarkId::new("to_json", size), &size, |b, _| {
            b.iter(|| black_box(&snapshot).to_json())
        });

        group.bench_with_input(BenchmarkId::new("import", size), &size, |b, _| {
            b.iter(|| MemoryDatastore::from_snapshot(black_box(snapshot.clone())))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_codec,
    bench_record_operations,
    bench_list,
    bench_snapshot,
);
criterion_main!(benches);
