//! Partition ordered sequences across worker threads and merge the results in order.
//!
//! This crate provides the [`Strategy`] trait, which runs a caller-supplied computation over
//! contiguous blocks of a slice and combines the per-block results, always in block order. The
//! answer therefore never depends on which block finishes first.
//!
//! # Overview
//!
//! A call proceeds in four steps:
//!
//! 1. [`partition`](partition::partition) splits `values` into `min(threads, values.len())`
//!    contiguous blocks whose lengths differ by at most one.
//! 2. A task is evaluated once per block (concurrently, for [`Parallel`]).
//! 3. The caller waits for every block, in order. With [`Parallel`] this wait can be interrupted
//!    (see [`interrupt`]), in which case the call fails with [`Error::ExecutionInterrupted`].
//! 4. A collector folds the per-block results, in block order, into the final value.
//!
//! **Core Operation:**
//! - [`execute`](Strategy::execute): run an arbitrary (task, collector) pair
//!
//! **Operations built on `execute`:**
//! - [`join`](Strategy::join), [`map`](Strategy::map), [`filter`](Strategy::filter)
//! - [`minimum`](Strategy::minimum), [`maximum`](Strategy::maximum)
//! - [`any`](Strategy::any), [`all`](Strategy::all), [`count`](Strategy::count)
//! - [`reduce`](Strategy::reduce), [`map_reduce`](Strategy::map_reduce) over a [`Monoid`]
//!
//! Two implementations are provided:
//!
//! - [`Sequential`]: Evaluates every block on the calling thread
//! - [`Parallel`]: Evaluates every block on its own, freshly spawned, thread
//!
//! # Example
//!
//! ```
//! use iterative_parallelism::{Monoid, Parallel, Strategy};
//!
//! let strategy = Parallel::default();
//! let data = [5, 1, 4, 2, 3];
//!
//! assert_eq!(strategy.map(2, &data, |x| x * 2).unwrap(), vec![10, 2, 8, 4, 6]);
//! assert_eq!(*strategy.minimum(3, &data, |a, b| a.cmp(b)).unwrap(), 1);
//! assert_eq!(strategy.reduce(4, &data, &Monoid::sum()).unwrap(), 15);
//! ```

use std::{cmp::Ordering, fmt};
use thiserror::Error;

mod barrier;
pub use barrier::{Interrupted, Interruption};
pub mod interrupt;
use interrupt::Cancellation;
mod monoid;
pub use monoid::Monoid;
pub mod parallel;
pub use parallel::Parallel;
pub mod partition;
mod sequential;
pub use sequential::Sequential;

/// Errors that can occur when executing a [Strategy].
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("no such element")]
    NoSuchElement,
    #[error("execution interrupted: {0}")]
    ExecutionInterrupted(#[from] Interrupted),
    #[error("failed to spawn worker {partition}: {source}")]
    Spawn {
        partition: usize,
        source: std::io::Error,
    },
    #[error("worker {partition} panicked")]
    WorkerPanicked { partition: usize },
}

/// A strategy for evaluating per-partition tasks and combining their results.
///
/// Implementations decide where tasks run. They must all partition the input with
/// [partition::partition], pass each task its own partition, and hand the partial results to the
/// collector in partition order.
pub trait Strategy: Clone + Send + Sync + fmt::Debug + 'static {
    /// Evaluates `task` on every partition of `values` and combines the partial results.
    ///
    /// # Arguments
    ///
    /// - `threads`: The requested number of partitions (at most `values.len()` are used)
    /// - `values`: The sequence to partition
    /// - `task`: Computes a partial result from one partition. The [Cancellation] is a
    ///   best-effort request to return early, after which the partial result is discarded.
    /// - `collector`: Combines the partial results, received in partition order
    ///
    /// Returns [Error::InvalidArgument] if `threads` is zero. An empty `values` yields no
    /// partitions, and the collector receives an empty `Vec`.
    ///
    /// # Examples
    ///
    /// ```
    /// use iterative_parallelism::{Sequential, Strategy};
    ///
    /// let data = [1, 2, 3, 4, 5];
    /// let lens = Sequential
    ///     .execute(2, &data, |chunk, _| chunk.len(), |lens| lens)
    ///     .unwrap();
    /// assert_eq!(lens, vec![3, 2]);
    /// ```
    fn execute<'a, T, P, R, TK, C>(
        &self,
        threads: usize,
        values: &'a [T],
        task: TK,
        collector: C,
    ) -> Result<R, Error>
    where
        T: Sync,
        P: Send,
        TK: Fn(&'a [T], &Cancellation) -> P + Sync,
        C: FnOnce(Vec<P>) -> R;

    /// Concatenates the string form of every element.
    fn join<T>(&self, threads: usize, values: &[T]) -> Result<String, Error>
    where
        T: fmt::Display + Sync,
    {
        self.execute(
            threads,
            values,
            |chunk, cancellation| {
                let mut joined = String::new();
                for value in cancellation.until_cancelled(chunk) {
                    joined.push_str(&value.to_string());
                }
                joined
            },
            |parts| parts.concat(),
        )
    }

    /// Applies `mapper` to every element, preserving order.
    fn map<T, U, F>(&self, threads: usize, values: &[T], mapper: F) -> Result<Vec<U>, Error>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync,
    {
        self.execute(
            threads,
            values,
            |chunk, cancellation| {
                cancellation
                    .until_cancelled(chunk)
                    .map(&mapper)
                    .collect::<Vec<_>>()
            },
            |parts| parts.into_iter().flatten().collect(),
        )
    }

    /// Keeps the elements satisfying `predicate`, preserving order.
    fn filter<T, F>(&self, threads: usize, values: &[T], predicate: F) -> Result<Vec<T>, Error>
    where
        T: Clone + Send + Sync,
        F: Fn(&T) -> bool + Sync,
    {
        self.execute(
            threads,
            values,
            |chunk, cancellation| {
                cancellation
                    .until_cancelled(chunk)
                    .filter(|value| predicate(value))
                    .cloned()
                    .collect::<Vec<_>>()
            },
            |parts| parts.into_iter().flatten().collect(),
        )
    }

    /// Returns the earliest element that no other element orders before.
    ///
    /// Returns [Error::NoSuchElement] if `values` is empty.
    fn minimum<'a, T, F>(
        &self,
        threads: usize,
        values: &'a [T],
        comparator: F,
    ) -> Result<&'a T, Error>
    where
        T: Sync,
        F: Fn(&T, &T) -> Ordering + Sync,
    {
        if values.is_empty() {
            return Err(Error::NoSuchElement);
        }
        let comparator = &comparator;
        self.execute(
            threads,
            values,
            |chunk, cancellation| {
                cancellation
                    .until_cancelled(chunk)
                    .min_by(|a, b| comparator(a, b))
            },
            |partials| {
                partials
                    .into_iter()
                    .flatten()
                    .min_by(|a, b| comparator(a, b))
            },
        )?
        .ok_or(Error::NoSuchElement)
    }

    /// Returns the earliest element that no other element orders after.
    ///
    /// Defined as [minimum](Self::minimum) under the reversed comparator. Returns
    /// [Error::NoSuchElement] if `values` is empty.
    fn maximum<'a, T, F>(
        &self,
        threads: usize,
        values: &'a [T],
        comparator: F,
    ) -> Result<&'a T, Error>
    where
        T: Sync,
        F: Fn(&T, &T) -> Ordering + Sync,
    {
        self.minimum(threads, values, move |a, b| comparator(a, b).reverse())
    }

    /// Returns true if any element satisfies `predicate` (false for an empty sequence).
    fn any<T, F>(&self, threads: usize, values: &[T], predicate: F) -> Result<bool, Error>
    where
        T: Sync,
        F: Fn(&T) -> bool + Sync,
    {
        self.execute(
            threads,
            values,
            |chunk, cancellation| cancellation.until_cancelled(chunk).any(&predicate),
            |found| found.into_iter().any(|found| found),
        )
    }

    /// Returns true if every element satisfies `predicate` (true for an empty sequence).
    fn all<T, F>(&self, threads: usize, values: &[T], predicate: F) -> Result<bool, Error>
    where
        T: Sync,
        F: Fn(&T) -> bool + Sync,
    {
        self.any(threads, values, move |value| !predicate(value))
            .map(|found| !found)
    }

    /// Counts the elements satisfying `predicate`.
    fn count<T, F>(&self, threads: usize, values: &[T], predicate: F) -> Result<usize, Error>
    where
        T: Sync,
        F: Fn(&T) -> bool + Sync,
    {
        self.execute(
            threads,
            values,
            |chunk, cancellation| {
                cancellation
                    .until_cancelled(chunk)
                    .filter(|value| predicate(value))
                    .count()
            },
            |counts| counts.into_iter().sum(),
        )
    }

    /// Folds every element with `monoid`, returning the identity for an empty sequence.
    fn reduce<T, F>(&self, threads: usize, values: &[T], monoid: &Monoid<T, F>) -> Result<T, Error>
    where
        T: Clone + Send + Sync,
        F: Fn(T, T) -> T + Sync,
    {
        self.execute(
            threads,
            values,
            |chunk, cancellation| monoid.fold(cancellation.until_cancelled(chunk).cloned()),
            |partials| monoid.fold(partials),
        )
    }

    /// Maps every element with `mapper` and folds the results with `monoid`.
    ///
    /// Returns the identity for an empty sequence.
    fn map_reduce<T, R, M, F>(
        &self,
        threads: usize,
        values: &[T],
        mapper: M,
        monoid: &Monoid<R, F>,
    ) -> Result<R, Error>
    where
        T: Sync,
        R: Clone + Send + Sync,
        M: Fn(&T) -> R + Sync,
        F: Fn(R, R) -> R + Sync,
    {
        self.execute(
            threads,
            values,
            |chunk, cancellation| monoid.fold(cancellation.until_cancelled(chunk).map(&mapper)),
            |partials| monoid.fold(partials),
        )
    }
}
