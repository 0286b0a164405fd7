//! Performance benchmarks for trip-engine

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trip_engine::{
    compile, partition_by_name, validate, MembershipFilter, QueryCriteria, SortAttribute,
    SortOrder, Trip, TripDraft, TripQuery,
};

const TAGS: [&str; 5] = ["beach", "city", "ski", "food", "hiking"];
const COUNTRIES: [&str; 4] = ["Portugal", "Spain", "Italy", "Norway"];

fn make_trips(count: usize) -> Vec<Trip> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            let start = base + Duration::days((i % 300) as i64);
            let end = start + Duration::days((i % 14) as i64 + 1);
            let draft = TripDraft::new(format!("Trip {}", i), start, end)
                .with_price((i * 37 % 2000) as i64)
                .with_tag(TAGS[i % TAGS.len()])
                .with_tag(TAGS[(i / 3) % TAGS.len()])
                .with_country(COUNTRIES[i % COUNTRIES.len()]);
            Trip::from_draft(i as i64 + 1, draft.length_in_days(), draft)
        })
        .collect()
}

fn full_criteria() -> QueryCriteria {
    QueryCriteria::new()
        .price_between(Some(100), Some(1500))
        .length_between(Some(2), None)
        .starting_between(NaiveDate::from_ymd_opt(2024, 2, 1), None)
        .name_containing("trip 1")
        .with_tags(MembershipFilter::any(["beach", "ski", "food"]))
        .with_countries(MembershipFilter::each(["Spain"]))
        .sorted(SortAttribute::Price, SortOrder::Desc)
}

fn bench_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("compilation");

    group.bench_function("compile_empty", |b| {
        let criteria = QueryCriteria::new();
        b.iter(|| compile(black_box(&criteria)))
    });

    group.bench_function("compile_full", |b| {
        let criteria = full_criteria();
        b.iter(|| compile(black_box(&criteria)))
    });

    group.bench_function("validate_full", |b| {
        let criteria = full_criteria();
        b.iter(|| validate(black_box(&criteria)))
    });

    group.finish();
}

fn bench_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("execution");

    for size in [100, 1000, 10000].iter() {
        let trips = make_trips(*size);

        group.bench_with_input(BenchmarkId::new("sorted_all", size), &trips, |b, trips| {
            let query = TripQuery::sorted_all(SortAttribute::StartDate, SortOrder::Asc);
            b.iter(|| query.run(black_box(trips)))
        });

        group.bench_with_input(BenchmarkId::new("filtered", size), &trips, |b, trips| {
            let query = compile(&full_criteria());
            b.iter(|| query.run(black_box(trips)))
        });
    }

    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [100, 1000].iter() {
        let drafts: Vec<TripDraft> = make_trips(*size)
            .into_iter()
            .map(|trip| trip.to_draft())
            .collect();

        group.bench_with_input(
            BenchmarkId::new("partition_by_name", size),
            &drafts,
            |b, drafts| b.iter(|| partition_by_name(black_box(drafts.clone()))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compilation, bench_execution, bench_partition);
criterion_main!(benches);
