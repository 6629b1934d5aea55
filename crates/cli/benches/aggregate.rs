// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Coverage aggregation benchmarks.
//!
//! Measures merging per-harness payloads and rendering the merged result
//! across suite sizes. Payloads are generated in memory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::path::Path;

use castle::coverage::CoverageResult;
use castle::report::{CoverageFormatter, HtmlFormatter, LcovFormatter};
use castle::spec::SpecId;

const LINES_PER_FILE: u64 = 400;

/// One payload per spec: its own file plus a helper entry that merging skips.
fn payloads(specs: usize) -> Vec<(SpecId, CoverageResult)> {
    (0..specs)
        .map(|i| {
            let id = SpecId::from_relative(Path::new(&format!("widgets/w{i}.js")));
            let files: Vec<_> = [format!("w{i}.js"), "helpers.js".to_string()]
                .iter()
                .map(|name| file_json(name, i as u64))
                .collect();
            let json = format!(r#"{{"files": [{}]}}"#, files.join(","));
            (id, CoverageResult::parse(&json, "bench").unwrap())
        })
        .collect()
}

fn file_json(filename: &str, seed: u64) -> String {
    let mut hits = 0;
    let source: Vec<String> = (1..=LINES_PER_FILE)
        .map(|line| {
            let count = if (line + seed) % 3 == 0 { 0 } else { line % 7 + 1 };
            if count > 0 {
                hits += 1;
            }
            format!(r#""{line}": {{"coverage": {count}, "source": "x = {line};"}}"#)
        })
        .collect();
    format!(
        r#"{{"filename": "{filename}", "hits": {hits}, "misses": {}, "sloc": {LINES_PER_FILE}, "source": {{{}}}}}"#,
        LINES_PER_FILE - hits,
        source.join(",")
    )
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("coverage/aggregate");

    for specs in [1, 10, 100] {
        let data = payloads(specs);
        group.bench_with_input(BenchmarkId::new("merge", specs), &data, |b, data| {
            b.iter(|| CoverageResult::aggregate(black_box(data).iter().map(|(id, p)| (id, p))))
        });
    }
    group.finish();
}

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("coverage/format");

    for specs in [10, 100] {
        let data = payloads(specs);
        let merged = CoverageResult::aggregate(data.iter().map(|(id, p)| (id, p)));

        group.bench_with_input(BenchmarkId::new("html", specs), &merged, |b, r| {
            b.iter(|| HtmlFormatter.format(black_box(r)))
        });
        group.bench_with_input(BenchmarkId::new("lcov", specs), &merged, |b, r| {
            b.iter(|| LcovFormatter.format(black_box(r)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_format);
criterion_main!(benches);
