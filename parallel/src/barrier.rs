//! Wait for every worker, in partition order, while remaining interruptible.
//!
//! The barrier observes the completion of worker `0`, then worker `1`, and so on. If the
//! [Interrupt] fires while it waits, the barrier records an [Interruption], asks every worker it
//! has not yet seen finish to stop, and then keeps waiting on the same worker. It never returns
//! before every worker has reported completion (or died), so no worker outlives the call.

use crate::interrupt::{Cancellation, Interrupt};
use futures::{
    channel::oneshot,
    executor::block_on,
    future::{select, Either},
};
use std::fmt;
use tracing::{trace, warn};

/// A single interruption observed while waiting on a worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("interrupted while awaiting partition {partition}")]
pub struct Interruption {
    /// The partition whose completion was being awaited.
    pub partition: usize,
}

/// Every interruption observed while joining the workers of one call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Interrupted {
    causes: Vec<Interruption>,
}

impl Interrupted {
    /// Interruptions in the order they were observed.
    pub fn causes(&self) -> &[Interruption] {
        &self.causes
    }

    fn record(&mut self, cause: Interruption) {
        self.causes.push(cause);
    }
}

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "not all workers joined cleanly: interrupted {} time(s)",
            self.causes.len()
        )
    }
}

impl std::error::Error for Interrupted {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes
            .first()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Observe every completion in order, returning the aggregate of any interruptions.
///
/// `completions[i]` resolves when worker `i` finishes (a dropped sender counts as finished).
/// `cancellations[i]` is worker `i`'s stop request.
pub(crate) fn join(
    completions: Vec<oneshot::Receiver<()>>,
    cancellations: &[Cancellation],
    interrupt: Option<&Interrupt>,
) -> Result<(), Interrupted> {
    let mut interrupted: Option<Interrupted> = None;
    for (partition, mut completion) in completions.into_iter().enumerate() {
        let Some(interrupt) = interrupt else {
            let _ = block_on(&mut completion);
            trace!(partition, "worker finished");
            continue;
        };
        loop {
            // Completion is polled first: a finished worker is never reported as interrupted.
            match block_on(select(&mut completion, interrupt.interrupted())) {
                Either::Left(_) => break,
                Either::Right(_) => {
                    warn!(partition, "interrupted while joining workers");
                    interrupted
                        .get_or_insert_with(Interrupted::default)
                        .record(Interruption { partition });
                    for cancellation in &cancellations[partition..] {
                        cancellation.cancel();
                    }
                }
            }
        }
        trace!(partition, "worker finished");
    }

    match interrupted {
        Some(interrupted) => Err(interrupted),
        None => Ok(()),
    }
}
