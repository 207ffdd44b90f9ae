use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A value whose debounce timer elapsed, tagged with the generation that
/// armed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled<T> {
    pub generation: u64,
    pub value: T,
}

/// Turns a stream of rapidly changing values into a settled value once the
/// input has been quiet for `delay`.
///
/// Every [`push`](Self::push) aborts the previously armed timer and arms a new
/// one, so at most one timer is pending at any time. A timer that already
/// fired before being superseded may have queued its value; [`accept`](Self::accept)
/// filters those out by generation. Dropping the debouncer aborts the pending
/// timer.
///
/// Timers are spawned onto the ambient tokio runtime, so `push` must be called
/// from within one.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    settled_tx: mpsc::UnboundedSender<Settled<T>>,
    armed: Option<JoinHandle<()>>,
    generation: u64,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<Settled<T>>) {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            settled_tx,
            armed: None,
            generation: 0,
        };
        (debouncer, settled_rx)
    }

    /// Arms a timer for `value`, invalidating whatever was pending.
    pub fn push(&mut self, value: T) -> u64 {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);

        let generation = self.generation;
        let delay = self.delay;
        let tx = self.settled_tx.clone();
        self.armed = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Settled { generation, value });
        }));

        tracing::trace!(generation, delay_ms = delay.as_millis() as u64, "debounce armed");
        generation
    }
}

impl<T> Debouncer<T> {
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.armed.is_some()
    }

    /// Releases the pending timer, if any. A value it may already have queued
    /// is rejected by [`accept`](Self::accept).
    pub fn cancel(&mut self) {
        if let Some(handle) = self.armed.take() {
            handle.abort();
        }
    }

    /// Returns the settled value if it came from the currently armed timer.
    pub fn accept(&mut self, settled: Settled<T>) -> Option<T> {
        if self.armed.is_none() || settled.generation != self.generation {
            tracing::trace!(
                generation = settled.generation,
                current = self.generation,
                "dropping superseded debounce value"
            );
            return None;
        }

        self.armed = None;
        Some(settled.value)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
