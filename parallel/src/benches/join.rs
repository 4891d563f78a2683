use criterion::{criterion_group, Criterion};
use iterative_parallelism::{Parallel, Strategy};

fn bench_join(c: &mut Criterion) {
    let parallel = Parallel::default();
    for n in [1_000, 100_000] {
        let values: Vec<u32> = (0..n).collect();
        for threads in [1, 4, 8] {
            c.bench_function(
                &format!("{}/n={} threads={}", module_path!(), n, threads),
                |b| b.iter(|| parallel.join(threads, &values).unwrap()),
            );
        }
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_join
}
