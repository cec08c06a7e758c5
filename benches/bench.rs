// Criterion benchmarks for Pawmatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pawmatch::core::query::to_query_string;
use pawmatch::{build_search_query, extract_from_cursor, FilterState};

fn create_filters(breed_count: usize) -> FilterState {
    let mut filters = FilterState::with_sort("age:desc".parse().unwrap());
    filters.set_breeds((0..breed_count).map(|i| format!("Breed {}", i)));
    filters.set_age_range(Some(1), Some(9)).unwrap();
    filters.set_zip_codes(["60614", "10001", "94103"]).unwrap();
    filters
}

fn bench_build_search_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_search_query");

    for breed_count in [0, 5, 50, 200].iter() {
        let filters = create_filters(*breed_count);

        group.bench_with_input(
            BenchmarkId::new("breeds", breed_count),
            breed_count,
            |b, _| {
                b.iter(|| build_search_query(black_box(&filters), black_box(25), black_box(Some("50"))));
            },
        );
    }

    group.finish();
}

fn bench_query_string(c: &mut Criterion) {
    let params = build_search_query(&create_filters(20), 25, Some("50"));

    c.bench_function("to_query_string_20_breeds", |b| {
        b.iter(|| to_query_string(black_box(&params)));
    });
}

fn bench_extract_from_cursor(c: &mut Criterion) {
    c.bench_function("extract_from_cursor_relative", |b| {
        b.iter(|| extract_from_cursor(black_box("/dogs/search?size=25&from=75&sort=breed:asc")));
    });

    c.bench_function("extract_from_cursor_absolute", |b| {
        b.iter(|| {
            extract_from_cursor(black_box(
                "https://frontend-take-home-service.fetch.com/dogs/search?breeds=Pug&from=100",
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_build_search_query,
    bench_query_string,
    bench_extract_from_cursor
);

criterion_main!(benches);
