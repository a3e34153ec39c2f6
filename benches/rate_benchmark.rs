//! Benchmarks for the rating engine and the metadata parsers.

use criterion::{criterion_group, criterion_main, Criterion};
use pyrind::extract::pkginfo;
use pyrind::model::{Field, MetadataRecord};
use pyrind::CheckRegistry;
use std::hint::black_box;

const PKG_INFO: &str = "\
Metadata-Version: 2.1
Name: benchcase
Version: 2.1.0
Summary: A package used to benchmark the metadata parsers.
Home-page: https://example.org/benchcase
Author-email: Jane Doe <jane@example.org>
License: MIT
Keywords: packaging,benchmark
Classifier: Development Status :: 5 - Production/Stable
Classifier: Programming Language :: Python :: 3.11
Classifier: License :: OSI Approved :: MIT License
Requires-Python: >=3.8

Benchcase
=========

A long description body that is comfortably over the length threshold,
so every description check takes its normal path.
";

fn full_record() -> MetadataRecord {
    pkginfo::parse(PKG_INFO).expect("benchmark fixture parses")
}

fn benchmark_rate(c: &mut Criterion) {
    let registry = CheckRegistry::standard();
    let record = full_record();
    c.bench_function("rate_full_record", |b| {
        b.iter(|| black_box(registry.rate(black_box(&record))))
    });

    let empty = MetadataRecord::new();
    c.bench_function("rate_empty_record", |b| {
        b.iter(|| black_box(registry.rate(black_box(&empty))))
    });
}

fn benchmark_parse(c: &mut Criterion) {
    c.bench_function("parse_pkginfo", |b| {
        b.iter(|| black_box(pkginfo::parse(black_box(PKG_INFO))))
    });
}

fn benchmark_registry_build(c: &mut Criterion) {
    c.bench_function("build_registry", |b| {
        b.iter(|| black_box(CheckRegistry::standard().check_names().len()))
    });
}

fn benchmark_rst(c: &mut Criterion) {
    let description = full_record()
        .str_value(Field::Description)
        .expect("fixture has a description")
        .to_string();
    c.bench_function("validate_rst", |b| {
        b.iter(|| black_box(pyrind::rst::validate(black_box(&description))))
    });
}

criterion_group!(
    benches,
    benchmark_rate,
    benchmark_parse,
    benchmark_registry_build,
    benchmark_rst
);
criterion_main!(benches);
