use async_channel::{Receiver, Sender};
use std::fmt;

/// A cancellation signal shared between a caller and its portal calls.
///
/// Cloning yields another handle to the same signal. Cancelling is
/// permanent; a cancelled `Cancellable` stays cancelled.
#[derive(Clone)]
pub struct Cancellable {
    // Nothing is ever sent; closing the channel is the signal, and it
    // wakes every receiver at once.
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Cancellable {
    pub fn new() -> Self {
        let (tx, rx) = async_channel::bounded(1);
        Self { tx, rx }
    }

    pub fn cancel(&self) {
        if self.tx.close() {
            log::trace!("cancellable triggered");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.is_closed()
    }

    /// Resolves once [`Cancellable::cancel`] has been called on any clone.
    pub async fn cancelled(&self) {
        while self.rx.recv().await.is_ok() {}
    }
}

impl Default for Cancellable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cancellable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancellable")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future;

    #[test]
    fn cancel_is_shared_between_clones() {
        let cancellable = Cancellable::new();
        let other = cancellable.clone();
        assert!(!other.is_cancelled());
        cancellable.cancel();
        assert!(other.is_cancelled());
        // Idempotent.
        cancellable.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn cancelled_resolves_after_cancel() {
        let cancellable = Cancellable::new();
        assert!(future::block_on(future::poll_once(cancellable.cancelled())).is_none());
        cancellable.cancel();
        async_io::block_on(cancellable.cancelled());
    }

    #[test]
    fn cancelled_wakes_a_pending_waiter() {
        let cancellable = Cancellable::new();
        let trigger = cancellable.clone();
        async_io::block_on(future::zip(cancellable.cancelled(), async move {
            future::yield_now().await;
            trigger.cancel();
        }));
    }
}
