//! Execute each partition on its own worker thread.
//!
//! Every call to [Parallel::execute](crate::Strategy::execute) partitions the input, spawns one
//! scoped thread per partition, and waits for them in partition order. Each worker owns exactly
//! one result slot (a disjoint `&mut` borrow), so no lock guards the partial results. Once every
//! worker has finished, the collector receives the partials in partition order, regardless of the
//! order in which the workers completed.
//!
//! Threads are created for the duration of a single call and never reused.

use crate::{
    barrier,
    interrupt::{Cancellation, Interrupt},
    partition::partition,
    Error, Strategy,
};
use futures::channel::oneshot;
use std::thread;
use tracing::{debug, trace, warn};

/// Configuration for [Parallel].
#[derive(Clone, Debug)]
pub struct Config {
    /// Prefix of worker thread names (workers are named `<name>-<partition>`).
    pub name: String,

    /// Stack size of each worker thread, if different from the platform default.
    pub stack_size: Option<usize>,

    /// Interrupts the calling thread while it waits for workers.
    ///
    /// When `None`, the wait cannot be interrupted.
    pub interrupt: Option<Interrupt>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "worker".into(),
            stack_size: None,
            interrupt: None,
        }
    }
}

/// A strategy that runs every partition on a freshly spawned thread.
///
/// # Interruption
///
/// If [Config::interrupt] fires while the caller is waiting, the call fails with
/// [Error::ExecutionInterrupted] once every worker has finished. Workers not yet observed to be
/// finished are asked to stop through their [Cancellation]. Workers that ignore the request run
/// to completion and their results are discarded.
///
/// # Panics
///
/// A panicking worker does not unwind into the caller: the call fails with
/// [Error::WorkerPanicked] after the remaining workers have finished.
#[derive(Clone, Debug, Default)]
pub struct Parallel {
    cfg: Config,
}

impl Parallel {
    /// Create a new [Parallel] strategy.
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    /// The configuration this strategy was created with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    fn builder(&self, partition: usize) -> thread::Builder {
        let builder = thread::Builder::new().name(format!("{}-{}", self.cfg.name, partition));
        match self.cfg.stack_size {
            Some(size) => builder.stack_size(size),
            None => builder,
        }
    }
}

impl From<Config> for Parallel {
    fn from(cfg: Config) -> Self {
        Self::new(cfg)
    }
}

impl Strategy for Parallel {
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
        self.dispatch(
            |partition| self.builder(partition),
            threads,
            values,
            task,
            collector,
        )
    }
}

impl Parallel {
    /// Run `task` on one thread per partition, each created by `builder`.
    fn dispatch<'a, T, P, R, B, TK, C>(
        &self,
        builder: B,
        threads: usize,
        values: &'a [T],
        task: TK,
        collector: C,
    ) -> Result<R, Error>
    where
        T: Sync,
        P: Send,
        B: Fn(usize) -> thread::Builder,
        TK: Fn(&'a [T], &Cancellation) -> P + Sync,
        C: FnOnce(Vec<P>) -> R,
    {
        let partitions = partition(values.len(), threads)?;
        debug!(
            elements = values.len(),
            partitions = partitions.len(),
            "dispatching workers"
        );

        let cancellations: Vec<Cancellation> =
            partitions.iter().map(|_| Cancellation::new()).collect();
        let mut slots: Vec<Option<P>> = partitions.iter().map(|_| None).collect();
        let task = &task;

        thread::scope(|scope| -> Result<(), Error> {
            let mut handles = Vec::with_capacity(partitions.len());
            let mut completions = Vec::with_capacity(partitions.len());
            for ((partition, slot), cancellation) in
                partitions.iter().zip(slots.iter_mut()).zip(&cancellations)
            {
                let chunk = partition.slice(values);
                let (done, completion) = oneshot::channel();
                let spawned = builder(partition.index()).spawn_scoped(scope, move || {
                    *slot = Some(task(chunk, cancellation));
                    let _ = done.send(());
                });
                match spawned {
                    Ok(handle) => {
                        trace!(
                            partition = partition.index(),
                            start = partition.start(),
                            len = partition.len(),
                            "spawned worker"
                        );
                        handles.push(handle);
                        completions.push(completion);
                    }
                    Err(source) => {
                        warn!(partition = partition.index(), ?source, "failed to spawn worker");
                        for cancellation in &cancellations {
                            cancellation.cancel();
                        }
                        for handle in handles {
                            let _ = handle.join();
                        }
                        return Err(Error::Spawn {
                            partition: partition.index(),
                            source,
                        });
                    }
                }
            }

            let joined = barrier::join(completions, &cancellations, self.cfg.interrupt.as_ref());

            // Every worker has finished (or panicked), so these joins return immediately.
            let mut panicked = None;
            for (partition, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    warn!(partition, "worker panicked");
                    panicked.get_or_insert(partition);
                }
            }

            joined?;
            match panicked {
                Some(partition) => Err(Error::WorkerPanicked { partition }),
                None => Ok(()),
            }
        })?;

        let partials: Vec<P> = slots.into_iter().flatten().collect();
        debug_assert_eq!(partials.len(), partitions.len());
        debug!(partials = partials.len(), "combining partial results");
        Ok(collector(partials))
    }
}
