//! Benchmarks for single-snippet characterization and batch throughput.
//!
//! - `characterize`: one snippet per language through the full pipeline
//! - `language_detection`: text-only detection, no parse
//! - `batch`: the same snippets analyzed on the rayon pool

use codeprint::core::Language;
use codeprint::pipeline::{analyze_batch, BatchInput, Characterizer};
use codeprint::{detect_language, AdapterRegistry, ParserProvider, TreeSitterProvider};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

const SNIPPETS: &[(&str, &str)] = &[
    (
        "python",
        r#"
import json
from collections import defaultdict

class Inventory:
    def __init__(self, items):
        self.items = items

    def group_by_kind(self):
        groups = defaultdict(list)
        for item in self.items:
            if item.get("kind"):
                groups[item["kind"]].append(item)
        return groups

def fib(n):
    if n < 2:
        return n
    return fib(n - 1) + fib(n - 2)

if __name__ == "__main__":
    print(json.dumps(Inventory([]).group_by_kind()))
"#,
    ),
    (
        "javascript",
        r#"
const express = require('express');
const app = express();

function hasDuplicate(arr) {
  for (let i = 0; i < arr.length; i++) {
    for (let j = i + 1; j < arr.length; j++) {
      if (arr[i] === arr[j]) return true;
    }
  }
  return false;
}

app.get('/dup', (req, res) => res.json({ dup: hasDuplicate(req.query.items || []) }));
app.listen(3000);
"#,
    ),
    (
        "go",
        r#"
package main

import "fmt"

func search(xs []int, target int) int {
	lo, hi := 0, len(xs)-1
	for lo <= hi {
		mid := (lo + hi) / 2
		if xs[mid] == target {
			return mid
		} else if xs[mid] < target {
			lo = mid + 1
		} else {
			hi = mid - 1
		}
	}
	return -1
}

func main() {
	fmt.Println(search([]int{1, 2, 3}, 2))
}
"#,
    ),
];

fn bench_characterize(c: &mut Criterion) {
    let characterizer = Characterizer::new();
    let mut group = c.benchmark_group("characterize");
    for (name, source) in SNIPPETS {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| characterizer.characterize(black_box(source)))
        });
    }
    group.finish();
}

fn bench_language_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("language_detection");
    for (name, source) in SNIPPETS {
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| detect_language(black_box(source)))
        });
    }
    group.finish();
}

fn bench_parse_and_complexity(c: &mut Criterion) {
    let provider = TreeSitterProvider::new();
    let registry = AdapterRegistry::default();
    let source = SNIPPETS[0].1;
    c.bench_function("parse_and_complexity/python", |b| {
        b.iter(|| {
            let tree = provider.parse(black_box(source), Language::Python).unwrap();
            codeprint::analyze_complexity(&tree, &registry)
        })
    });
}

fn bench_batch(c: &mut Criterion) {
    let characterizer = Characterizer::new();
    let inputs: Vec<BatchInput> = (0..32)
        .map(|i| {
            let (name, source) = SNIPPETS[i % SNIPPETS.len()];
            BatchInput::new(format!("{name}-{i}"), source)
        })
        .collect();

    let mut group = c.benchmark_group("batch");
    group.throughput(Throughput::Elements(inputs.len() as u64));
    group.bench_function("32_snippets", |b| {
        b.iter(|| analyze_batch(&characterizer, black_box(&inputs)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_characterize,
    bench_language_detection,
    bench_parse_and_complexity,
    bench_batch
);
criterion_main!(benches);
