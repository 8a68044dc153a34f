use budget_tracker::engine::Ledger;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;
use tempfile::TempDir;

const KINDS: [&str; 2] = ["income", "expense"];
const CATEGORIES: [&str; 4] = ["Salary", "Food", "Rent", "Travel"];

/// Writes a ledger file holding `count` transactions spread across a handful
/// of categories.
fn seed_ledger_file(path: &Path, count: usize) {
    let mut contents = String::new();
    for i in 0..count {
        contents.push_str(&format!(
            "{}|{}.25|{}|entry {}|2024-06-01 09:30:00\n",
            KINDS[i % KINDS.len()],
            i + 1,
            CATEGORIES[i % CATEGORIES.len()],
            i
        ));
    }
    std::fs::write(path, contents).unwrap();
}

fn criterion_benchmark(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();

    let small = dir.path().join("small.txt");
    seed_ledger_file(&small, 100);
    let large = dir.path().join("large.txt");
    seed_ledger_file(&large, 10_000);

    c.bench_function("reload_small", |b| {
        b.iter(|| Ledger::open(black_box(&small)))
    });

    c.bench_function("reload_large", |b| {
        b.iter(|| Ledger::open(black_box(&large)))
    });

    let ledger = Ledger::open(&large).unwrap();

    c.bench_function("summary_large", |b| b.iter(|| black_box(&ledger).summary()));

    c.bench_function("filter_large", |b| {
        b.iter(|| {
            black_box(&ledger)
                .filter(black_box(Some("expense")), black_box(Some("food")))
                .map(|matches| matches.len())
        })
    });

    c.bench_function("persist_large", |b| b.iter(|| black_box(&ledger).persist()));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
