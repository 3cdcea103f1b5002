use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use stockroom_core::ProductId;
use stockroom_products::{
    diff, find_blacklisted_word, validate, BlacklistWord, Product, ProductDraft,
};

fn draft(name: &str, price: f64, quantity: i64) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        category: "Elektronika".to_string(),
        description: "bench product".to_string(),
        price,
        quantity,
    }
}

fn blacklist(size: usize) -> Vec<BlacklistWord> {
    (0..size).map(|i| BlacklistWord::new(format!("banned{i}"))).collect()
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");

    let existing = Product::from_draft(ProductId::new(), draft("Widget1", 500.0, 2), Utc::now());

    group.bench_function("valid_candidate_create", |b| {
        let candidate = draft("Widget2", 750.0, 5);
        b.iter(|| validate(black_box(&candidate), None, None).unwrap());
    });

    group.bench_function("valid_candidate_update_same_name", |b| {
        let candidate = draft("Widget1", 750.0, 5);
        b.iter(|| validate(black_box(&candidate), Some(existing.id), Some(&existing)).unwrap());
    });

    group.bench_function("rejected_on_charset", |b| {
        let candidate = draft("Widget 1", 750.0, 5);
        b.iter(|| validate(black_box(&candidate), None, None).unwrap_err());
    });

    group.finish();
}

fn bench_blacklist_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("blacklist_scan");

    for size in [10usize, 100, 1_000].iter() {
        let words = blacklist(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| find_blacklisted_word(black_box("SuperCleanPhone12"), &words));
        });
    }

    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    let old = Product::from_draft(ProductId::new(), draft("Widget1", 500.0, 2), Utc::now());
    let unchanged = old.clone();
    let changed = old.with_changes(&ProductDraft {
        description: "changed".to_string(),
        ..draft("Widget9", 750.0, 5)
    });

    group.bench_function("no_changes", |b| {
        b.iter(|| diff(black_box(&old), black_box(&unchanged)));
    });
    group.bench_function("all_fields_changed", |b| {
        b.iter(|| diff(black_box(&old), black_box(&changed)));
    });

    group.finish();
}

criterion_group!(benches, bench_validation, bench_blacklist_scan, bench_diff);
criterion_main!(benches);
