//! Unifier and whole-rewrite benchmarks.

use anyfix::infer::{NodeId, SemanticModel, UsageCollector};
use anyfix::solver::{TypeId, UnionPolicy, unify_candidates};
use anyfix::{DriverOptions, Program, RewriteSettings, rewrite_sources};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// `function f(x) {}` called with `count` arguments built by `argument`.
fn calls(count: usize, argument: impl Fn(usize) -> String) -> String {
    let mut source = String::from("function f(x) {}\n");
    for i in 0..count {
        source.push_str(&format!("f({});\n", argument(i)));
    }
    source
}

fn candidates_for(source: &str) -> (Program, Vec<TypeId>) {
    let program = Program::from_sources([("bench.ts", source)]).expect("program");
    let file = program.file_by_name("bench.ts").expect("bench.ts");
    let x: NodeId = program.bindings(file)[0];
    let candidates = UsageCollector::new(&program).collect(x);
    (program, candidates)
}

fn bench_unify(c: &mut Criterion) {
    let mut group = c.benchmark_group("unify_candidates");
    let policy = UnionPolicy::default();

    let test_cases = [
        ("literals_4", calls(4, |i| i.to_string())),
        ("literals_64", calls(64, |i| i.to_string())),
        ("duplicates_64", calls(64, |i| (i % 3).to_string())),
        ("mixed_64", calls(64, |i| {
            if i % 2 == 0 {
                i.to_string()
            } else {
                format!("\"s{i}\"")
            }
        })),
        ("objects_16", calls(16, |i| format!("{{ id: {i}, field{i}: \"v\" }}"))),
    ];

    for (name, source) in &test_cases {
        let (program, candidates) = candidates_for(source);
        group.bench_with_input(BenchmarkId::new("unify", name), &candidates, |b, candidates| {
            b.iter(|| {
                let found = unify_candidates(&program, black_box(candidates), &policy);
                black_box(found.map(|model| model.render()))
            })
        });
    }

    group.finish();
}

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    group.sample_size(20);

    for functions in [4usize, 16, 64] {
        let mut source = String::new();
        for i in 0..functions {
            source.push_str(&format!(
                "function step{i}(value, label) {{ return `${{label}}: ${{value - 1}}`; }}\n"
            ));
            source.push_str(&format!("step{i}({i}, \"step\");\n"));
        }
        group.bench_with_input(
            BenchmarkId::new("fixpoint", functions),
            &source,
            |b, source| {
                b.iter(|| {
                    let output = rewrite_sources(
                        [("bench.ts", source.as_str())],
                        &DriverOptions::default(),
                        RewriteSettings::default(),
                    )
                    .expect("rewrite");
                    black_box(output.report.total_changes)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_unify, bench_rewrite);
criterion_main!(benches);
