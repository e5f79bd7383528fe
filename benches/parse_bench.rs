//! Benchmarks for spec parsing and concretization.

use buildspec::registry::{FixedHostArch, MockCompilerRegistry, MockRepo, Recipe};
use buildspec::{concretizer, normalizer, parser, Spec};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn chain_repo(depth: usize) -> MockRepo {
    let mut repo = MockRepo::new().with_recipe(Recipe::new(format!("pkg{}", depth - 1), "1.0"));
    for i in (0..depth - 1).rev() {
        let dep = Spec::new(format!("pkg{}", i + 1));
        repo = repo.with_recipe(Recipe::new(format!("pkg{i}"), "1.0").with_dependency(dep));
    }
    repo
}

fn bench_parse(c: &mut Criterion) {
    let compilers = MockCompilerRegistry::from_names(["gcc"]);
    let mut group = c.benchmark_group("parse");

    for size in [1, 10, 50] {
        let text = format!(
            "root{} ^dep @1.2:1.4 +debug %gcc @9.1",
            "_x".repeat(size)
        );
        group.bench_with_input(BenchmarkId::new("spec", size), &size, |b, _| {
            b.iter(|| black_box(parser::parse_one(&text, &compilers).unwrap()));
        });
    }

    group.finish();
}

fn bench_normalize_and_concretize(c: &mut Criterion) {
    let compilers = MockCompilerRegistry::from_names(["gcc"]);
    let host = FixedHostArch::new("linux-x86_64");
    let mut group = c.benchmark_group("normalize_concretize");

    for depth in [5, 20, 50] {
        let repo = chain_repo(depth);
        group.bench_with_input(BenchmarkId::new("chain", depth), &depth, |b, _| {
            b.iter(|| {
                let mut spec = parser::parse_one("pkg0", &compilers).unwrap();
                normalizer::normalize(&mut spec, &repo).unwrap();
                concretizer::concretize(&mut spec, &repo, &compilers, &host).unwrap();
                black_box(spec)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_normalize_and_concretize);
criterion_main!(benches);
