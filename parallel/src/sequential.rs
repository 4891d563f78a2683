use crate::{interrupt::Cancellation, partition::partition, Error, Strategy};

/// A strategy that evaluates every partition on the calling thread.
///
/// Partitioning and combination are identical to [crate::Parallel], so for any deterministic
/// task both strategies return the same result. This makes [Sequential] useful for:
///
/// - Debugging and testing (deterministic execution)
/// - Small inputs where spawning threads costs more than it saves
/// - Checking a [crate::Parallel] result against a single-threaded baseline
///
/// A panicking task unwinds into the caller and the call can never be interrupted.
///
/// # Examples
///
/// ```
/// use iterative_parallelism::{Sequential, Strategy};
///
/// let strategy = Sequential;
/// let words = ["a", "b", "c"];
/// assert_eq!(strategy.join(2, &words).unwrap(), "abc");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Sequential;

impl Strategy for Sequential {
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
        C: FnOnce(Vec<P>) -> R,
    {
        let cancellation = Cancellation::new();
        let partials = partition(values.len(), threads)?
            .iter()
            .map(|partition| task(partition.slice(values), &cancellation))
            .collect();
        Ok(collector(partials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partials_follow_partitions() {
        let values: Vec<u8> = (0..7).collect();
        let partials = Sequential
            .execute(3, &values, |chunk, _| chunk.to_vec(), |partials| partials)
            .unwrap();
        assert_eq!(partials, vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]);
    }

    #[test]
    fn test_empty_input_runs_collector_once() {
        let values: [u8; 0] = [];
        let partials = Sequential
            .execute(4, &values, |chunk, _| chunk.len(), |partials| partials)
            .unwrap();
        assert!(partials.is_empty());
    }
}
