#![no_main]

use arbitrary::Arbitrary;
use iterative_parallelism::{Monoid, Parallel, Sequential, Strategy};
use libfuzzer_sys::fuzz_target;

const MAX_THREADS: u8 = 16;

#[derive(Arbitrary, Debug)]
enum Operation {
    Join,
    Map { factor: i32 },
    Filter { modulus: u8 },
    Minimum,
    Maximum,
    Any { threshold: i32 },
    All { threshold: i32 },
    Count { threshold: i32 },
    Reduce,
    MapReduce { factor: i32 },
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    threads: u8,
    values: Vec<i32>,
    operations: Vec<Operation>,
}

fn fuzz(input: FuzzInput) {
    let threads = (input.threads % MAX_THREADS) as usize + 1;
    let values = &input.values;
    let parallel = Parallel::default();
    let sum = Monoid::new(0i32, |a: i32, b: i32| a.wrapping_add(b));

    for operation in input.operations {
        match operation {
            Operation::Join => {
                let expected: String = values.iter().map(|v| v.to_string()).collect();
                assert_eq!(parallel.join(threads, values).unwrap(), expected);
            }
            Operation::Map { factor } => {
                let expected: Vec<i32> = values.iter().map(|v| v.wrapping_mul(factor)).collect();
                let got = parallel
                    .map(threads, values, |v| v.wrapping_mul(factor))
                    .unwrap();
                assert_eq!(got, expected);
            }
            Operation::Filter { modulus } => {
                let modulus = modulus as i32 + 1;
                let expected: Vec<i32> =
                    values.iter().copied().filter(|v| v % modulus == 0).collect();
                let got = parallel
                    .filter(threads, values, |v| v % modulus == 0)
                    .unwrap();
                assert_eq!(got, expected);
            }
            Operation::Minimum => {
                let got = parallel.minimum(threads, values, |a, b| a.cmp(b)).ok();
                assert_eq!(got, values.iter().min());
            }
            Operation::Maximum => {
                let got = parallel.maximum(threads, values, |a, b| a.cmp(b)).ok();
                let expected = Sequential.maximum(threads, values, |a, b| a.cmp(b)).ok();
                assert_eq!(got, expected);
                assert_eq!(got.copied(), values.iter().max().copied());
            }
            Operation::Any { threshold } => {
                let got = parallel.any(threads, values, |v| *v > threshold).unwrap();
                assert_eq!(got, values.iter().any(|v| *v > threshold));
            }
            Operation::All { threshold } => {
                let got = parallel.all(threads, values, |v| *v > threshold).unwrap();
                assert_eq!(got, values.iter().all(|v| *v > threshold));
            }
            Operation::Count { threshold } => {
                let got = parallel.count(threads, values, |v| *v > threshold).unwrap();
                assert_eq!(got, values.iter().filter(|v| **v > threshold).count());
            }
            Operation::Reduce => {
                let expected = values.iter().fold(0i32, |a, b| a.wrapping_add(*b));
                assert_eq!(parallel.reduce(threads, values, &sum).unwrap(), expected);
            }
            Operation::MapReduce { factor } => {
                let expected = values
                    .iter()
                    .fold(0i32, |a, b| a.wrapping_add(b.wrapping_mul(factor)));
                let got = parallel
                    .map_reduce(threads, values, |v| v.wrapping_mul(factor), &sum)
                    .unwrap();
                assert_eq!(got, expected);
            }
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
