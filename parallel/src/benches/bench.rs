use criterion::criterion_main;

mod join;
mod reduce;

criterion_main!(join::benches, reduce::benches);
