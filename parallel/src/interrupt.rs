//! Interrupt a caller waiting on workers and ask workers to stop.
//!
//! Two distinct signals cross thread boundaries during a call:
//!
//! - An [Interrupt] is observed by the calling thread while it waits for workers. It is raised
//!   from anywhere through the paired [Interrupter]. Interruptions are counted: each call to
//!   [Interrupter::interrupt] is observed exactly once, and one that arrives while nobody is
//!   waiting stays pending until the next wait.
//! - A [Cancellation] is handed to every worker. It is a best-effort request to stop: a worker
//!   may poll it and return early, or ignore it and run to completion.
//!
//! # Example
//!
//! ```rust
//! use iterative_parallelism::interrupt;
//!
//! let (interrupter, interrupt) = interrupt::channel();
//! interrupter.interrupt();
//! assert_eq!(interrupter.pending(), 1);
//! assert!(interrupt.take());
//! assert!(!interrupt.take());
//! ```

use futures::Future;
use std::{
    collections::HashMap,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    task::{Context, Poll, Waker},
};

#[derive(Debug, Default)]
struct Waiters {
    next: u64,
    wakers: HashMap<u64, Waker>,
}

#[derive(Debug, Default)]
struct Inner {
    pending: AtomicUsize,
    waiters: Mutex<Waiters>,
}

impl Inner {
    // A waker is never left half-registered, so a poisoned lock is still consistent.
    fn waiters(&self) -> MutexGuard<'_, Waiters> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create a connected [Interrupter] and [Interrupt].
pub fn channel() -> (Interrupter, Interrupt) {
    let inner = Arc::new(Inner::default());
    (
        Interrupter {
            inner: inner.clone(),
        },
        Interrupt { inner },
    )
}

/// Raises interruptions observed by the paired [Interrupt].
#[derive(Clone, Debug)]
pub struct Interrupter {
    inner: Arc<Inner>,
}

impl Interrupter {
    /// Interrupt a caller currently waiting on the paired [Interrupt] (or the next one to wait).
    ///
    /// Every registered waiter is woken. Exactly one of them consumes the interruption; the
    /// others go back to waiting.
    pub fn interrupt(&self) {
        self.inner.pending.fetch_add(1, Ordering::AcqRel);
        for waker in self.inner.waiters().wakers.values() {
            waker.wake_by_ref();
        }
    }

    /// Number of interruptions raised but not yet observed.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Number of callers currently waiting on the paired [Interrupt].
    pub fn waiters(&self) -> usize {
        self.inner.waiters().wakers.len()
    }
}

/// The observing side of an [Interrupter].
///
/// Clones share the same pending count, so an interruption is consumed by whichever clone
/// observes it first. Any number of callers may wait at the same time.
#[derive(Clone, Debug)]
pub struct Interrupt {
    inner: Arc<Inner>,
}

impl Interrupt {
    /// Consume one pending interruption, if any.
    pub fn take(&self) -> bool {
        self.inner
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// A future that resolves once an interruption is consumed.
    pub fn interrupted(&self) -> Wait<'_> {
        Wait {
            interrupt: self,
            id: None,
        }
    }
}

/// Future returned by [Interrupt::interrupted].
///
/// The waiter is registered on first poll and removed when the future resolves or is dropped.
#[derive(Debug)]
pub struct Wait<'a> {
    interrupt: &'a Interrupt,
    id: Option<u64>,
}

impl Wait<'_> {
    fn deregister(&mut self) {
        if let Some(id) = self.id.take() {
            self.interrupt.inner.waiters().wakers.remove(&id);
        }
    }
}

impl Future for Wait<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.interrupt.take() {
            this.deregister();
            return Poll::Ready(());
        }

        // Register before re-checking so an interruption raised in between is not lost.
        {
            let mut waiters = this.interrupt.inner.waiters();
            let id = match this.id {
                Some(id) => id,
                None => {
                    let id = waiters.next;
                    waiters.next += 1;
                    this.id = Some(id);
                    id
                }
            };
            waiters.wakers.insert(id, cx.waker().clone());
        }
        if this.interrupt.take() {
            this.deregister();
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

impl Drop for Wait<'_> {
    fn drop(&mut self) {
        self.deregister();
    }
}

/// A best-effort request for a worker to stop.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    cancelled: Arc<AtomicBool>,
}

impl Cancellation {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns true if this call was the first to do so.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Yield items from `iter` until cancellation is requested.
    pub fn until_cancelled<'a, I>(&'a self, iter: I) -> impl Iterator<Item = I::Item> + 'a
    where
        I: IntoIterator,
        I::IntoIter: 'a,
    {
        iter.into_iter().take_while(move |_| !self.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::{thread, time::Duration};

    #[test]
    fn test_interruptions_are_counted() {
        let (interrupter, interrupt) = channel();
        assert!(!interrupt.take());

        interrupter.interrupt();
        interrupter.interrupt();
        assert_eq!(interrupter.pending(), 2);

        assert!(interrupt.take());
        assert!(interrupt.take());
        assert!(!interrupt.take());
        assert_eq!(interrupter.pending(), 0);
    }

    #[test]
    fn test_pending_interruption_resolves_immediately() {
        let (interrupter, interrupt) = channel();
        interrupter.interrupt();
        block_on(interrupt.interrupted());
        assert_eq!(interrupter.pending(), 0);
    }

    #[test]
    fn test_interruption_wakes_waiter() {
        let (interrupter, interrupt) = channel();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            interrupter.interrupt();
        });
        block_on(interrupt.interrupted());
        handle.join().unwrap();
    }

    #[test]
    fn test_clones_share_pending() {
        let (interrupter, interrupt) = channel();
        let other = interrupt.clone();
        interrupter.interrupt();
        assert!(other.take());
        assert!(!interrupt.take());
    }

    #[test]
    fn test_waiter_deregisters() {
        let (interrupter, interrupt) = channel();
        {
            let mut wait = interrupt.interrupted();
            let waker = futures::task::noop_waker();
            let mut cx = Context::from_waker(&waker);
            assert!(Pin::new(&mut wait).poll(&mut cx).is_pending());
            assert_eq!(interrupter.waiters(), 1);
        }
        assert_eq!(interrupter.waiters(), 0);

        interrupter.interrupt();
        block_on(interrupt.interrupted());
        assert_eq!(interrupter.waiters(), 0);
    }

    #[test]
    fn test_every_concurrent_waiter_is_woken() {
        let (interrupter, interrupt) = channel();
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let interrupt = interrupt.clone();
                thread::spawn(move || block_on(interrupt.interrupted()))
            })
            .collect();
        while interrupter.waiters() < 3 {
            thread::sleep(Duration::from_millis(1));
        }

        for _ in 0..3 {
            interrupter.interrupt();
        }
        for waiter in waiters {
            waiter.join().unwrap();
        }
        assert_eq!(interrupter.pending(), 0);
        assert_eq!(interrupter.waiters(), 0);
    }

    #[test]
    fn test_cancellation() {
        let cancellation = Cancellation::new();
        assert!(!cancellation.is_cancelled());

        let worker = cancellation.clone();
        assert!(cancellation.cancel());
        assert!(!cancellation.cancel());
        assert!(worker.is_cancelled());
    }

    #[test]
    fn test_until_cancelled() {
        let cancellation = Cancellation::new();
        let values = [1, 2, 3, 4];
        let seen: Vec<_> = cancellation.until_cancelled(values.iter()).copied().collect();
        assert_eq!(seen, vec![1, 2, 3, 4]);

        cancellation.cancel();
        assert_eq!(cancellation.until_cancelled(values.iter()).count(), 0);
    }
}
