//! Synthesis benchmarks over realistic workloads.
//!
//! Run with:
//! ```bash
//! cargo bench --bench synthesis
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use sbdd_rs::bdd::Bdd;
use sbdd_rs::reference::Ref;
use sbdd_rs::trace::{self, Trace};

/// Build the N-Queens constraint BDD (the canonical synthesis workload).
fn solve_queens(bdd: &Bdd, n: usize) -> Ref {
    // Queen at row i, column j is variable i*n + j + 1.
    let var = |i: usize, j: usize| -> Ref { bdd.variable((i * n + j + 1) as u16) };

    let mut result = bdd.one();

    for i in 0..n {
        // At least one queen per row.
        let mut at_least_one = bdd.zero();
        for j in 0..n {
            at_least_one = bdd.apply_or(at_least_one, var(i, j));
        }
        result = bdd.apply_and(result, at_least_one);

        // At most one queen per row.
        for j1 in 0..n {
            for j2 in (j1 + 1)..n {
                let not_both = bdd.apply_or(-var(i, j1), -var(i, j2));
                result = bdd.apply_and(result, not_both);
            }
        }
    }

    // At most one queen per column.
    for j in 0..n {
        for i1 in 0..n {
            for i2 in (i1 + 1)..n {
                let not_both = bdd.apply_or(-var(i1, j), -var(i2, j));
                result = bdd.apply_and(result, not_both);
            }
        }
    }

    // No two queens on a diagonal.
    for i1 in 0..n {
        for j1 in 0..n {
            for i2 in (i1 + 1)..n {
                for j2 in 0..n {
                    let di = i2 - i1;
                    if j2 == j1 + di || (j1 >= di && j2 == j1 - di) {
                        let not_both = bdd.apply_or(-var(i1, j1), -var(i2, j2));
                        result = bdd.apply_and(result, not_both);
                    }
                }
            }
        }
    }

    result
}

fn bench_queens(c: &mut Criterion) {
    let mut group = c.benchmark_group("queens");
    for n in [4usize, 5, 6] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bencher, &n| {
            bencher.iter(|| {
                let bdd = Bdd::new((n * n) as u16, 49999, 49999);
                let result = solve_queens(&bdd, n);
                bdd.count_nodes(result)
            });
        });
    }
    group.finish();
}

const C17: &str = "\
MODULE c17
INPUT
  1gat,2gat,3gat,6gat,7gat;
OUTPUT
  22gat,23gat;
STRUCTURE
  10gat = nand(1gat, 3gat);
  11gat = nand(3gat, 6gat);
  16gat = nand(2gat, 11gat);
  19gat = nand(11gat, 7gat);
  22gat = nand(16gat, 19gat);
  23gat = nand(10gat, 16gat);
ENDMODULE
";

fn bench_trace(c: &mut Criterion) {
    let trace = Trace::parse(C17).unwrap();
    c.bench_function("trace/c17", |bencher| {
        bencher.iter(|| {
            let bdd = Bdd::new(trace.num_inputs() as u16, 521, 521);
            let outputs = trace::synthesize(&bdd, &trace).unwrap();
            outputs
                .iter()
                .map(|&(_, root)| bdd.count_nodes(root))
                .sum::<usize>()
        });
    });
}

criterion_group!(benches, bench_queens, bench_trace);
criterion_main!(benches);
