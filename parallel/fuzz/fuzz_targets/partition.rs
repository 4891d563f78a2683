#![no_main]

use arbitrary::Arbitrary;
use iterative_parallelism::{partition::partition, Error};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    len: u16,
    threads: u16,
}

fn fuzz(input: FuzzInput) {
    let len = input.len as usize;
    let threads = input.threads as usize;
    let partitions = match partition(len, threads) {
        Ok(partitions) => partitions,
        Err(Error::InvalidArgument(_)) => {
            assert_eq!(threads, 0);
            return;
        }
        Err(err) => panic!("unexpected error: {err}"),
    };

    assert_eq!(partitions.len(), threads.min(len));
    let mut next = 0;
    for (i, p) in partitions.iter().enumerate() {
        assert_eq!(p.index(), i);
        assert_eq!(p.start(), next);
        next = p.end();
    }
    assert_eq!(next, len);

    if let (Some(first), Some(last)) = (partitions.first(), partitions.last()) {
        assert!(first.len() - last.len() <= 1);
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
