//! Split a sequence into contiguous, order-preserving blocks.
//!
//! Given a sequence of `len` elements and a requested number of threads, [partition] produces
//! `min(threads, len)` blocks that together cover `[0, len)` exactly once. The first
//! `len % blocks` blocks hold one extra element, so block lengths never differ by more than one.
//!
//! # Example
//!
//! ```rust
//! use iterative_parallelism::partition::partition;
//!
//! let blocks = partition(10, 3).unwrap();
//! let lens: Vec<usize> = blocks.iter().map(|p| p.len()).collect();
//! assert_eq!(lens, vec![4, 3, 3]);
//! assert_eq!(blocks[1].range(), 4..7);
//! ```

use crate::Error;
use std::ops::Range;

/// A half-open range `[start, start + len)` of the input assigned to a single worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Partition {
    index: usize,
    start: usize,
    len: usize,
}

impl Partition {
    /// Position of this partition among its siblings (also the index of its result slot).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Offset of the first element covered by this partition.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last element covered by this partition.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Number of elements covered by this partition.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the partition covers no elements.
    ///
    /// [partition] never produces empty partitions.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The covered range, suitable for slicing.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Borrow the elements of `values` covered by this partition.
    ///
    /// # Panics
    ///
    /// Panics if `values` is shorter than the sequence this partition was computed for.
    pub fn slice<'a, T>(&self, values: &'a [T]) -> &'a [T] {
        &values[self.range()]
    }
}

/// Split `len` elements into `min(threads, len)` contiguous partitions.
///
/// Returns [Error::InvalidArgument] if `threads` is zero. An empty sequence yields no
/// partitions.
pub fn partition(len: usize, threads: usize) -> Result<Vec<Partition>, Error> {
    if threads == 0 {
        return Err(Error::InvalidArgument("thread count must be positive"));
    }
    let blocks = threads.min(len);
    if blocks == 0 {
        return Ok(Vec::new());
    }

    let base = len / blocks;
    let extra = len % blocks;
    let mut partitions = Vec::with_capacity(blocks);
    let mut start = 0;
    for index in 0..blocks {
        let len = if index < extra { base + 1 } else { base };
        partitions.push(Partition { index, start, len });
        start += len;
    }
    Ok(partitions)
}
