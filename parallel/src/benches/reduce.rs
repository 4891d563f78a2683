use criterion::{criterion_group, Criterion};
use iterative_parallelism::{Monoid, Parallel, Sequential, Strategy};

fn bench_reduce(c: &mut Criterion) {
    let sum = Monoid::<u64, _>::sum();
    for n in [1_000, 100_000, 1_000_000] {
        let values: Vec<u64> = (0..n).collect();
        for threads in [1, 2, 4, 8] {
            c.bench_function(
                &format!("{}/strategy=sequential n={} threads={}", module_path!(), n, threads),
                |b| b.iter(|| Sequential.reduce(threads, &values, &sum).unwrap()),
            );
            let parallel = Parallel::default();
            c.bench_function(
                &format!("{}/strategy=parallel n={} threads={}", module_path!(), n, threads),
                |b| b.iter(|| parallel.reduce(threads, &values, &sum).unwrap()),
            );
        }
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_reduce
}
