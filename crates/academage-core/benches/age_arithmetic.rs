use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use academage_core::chronological::chronological_age;
use academage_core::comparator::{age_difference, is_deficit};
use academage_core::encoding::to_years_months;
use academage_core::model::AgeEncoding;

fn bench_chronological(c: &mut Criterion) {
    let mut group = c.benchmark_group("chronological_age");
    let dob = NaiveDate::from_ymd_opt(2018, 5, 15).unwrap();
    let test = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();

    group.bench_function("months", |b| {
        b.iter(|| chronological_age(black_box(dob), black_box(test), AgeEncoding::Months))
    });

    group.bench_function("tenths", |b| {
        b.iter(|| chronological_age(black_box(dob), black_box(test), AgeEncoding::Tenths))
    });

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    group.bench_function("mixed_encodings", |b| {
        b.iter(|| age_difference(black_box("6.0"), black_box("6.11")))
    });

    group.bench_function("sentinel", |b| {
        b.iter(|| is_deficit(black_box("< 6.0"), black_box("7.3")))
    });

    group.bench_function("years_months", |b| {
        b.iter(|| to_years_months(black_box("> 10.4")))
    });

    group.finish();
}

criterion_group!(benches, bench_chronological, bench_compare);
criterion_main!(benches);
