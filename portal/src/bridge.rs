use crate::cancel::Cancellable;
use crate::transport::Transport;

/// Connects a caller's [`Cancellable`] to the portal request it guards.
///
/// While armed, a triggered cancellable means the request object must be
/// told to `Close`. Disarming (explicitly, after a response, or on drop)
/// detaches the bridge from the cancellable.
pub(crate) struct CancelBridge<'a> {
    transport: &'a dyn Transport,
    request_path: &'a str,
    cancellable: Option<Cancellable>,
}

impl<'a> CancelBridge<'a> {
    pub(crate) fn arm(
        transport: &'a dyn Transport,
        request_path: &'a str,
        cancellable: Option<&Cancellable>,
    ) -> Self {
        Self {
            transport,
            request_path,
            cancellable: cancellable.cloned(),
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.cancellable.is_some()
    }

    /// Whether the caller has already cancelled. Always false once disarmed.
    pub(crate) fn is_triggered(&self) -> bool {
        self.cancellable
            .as_ref()
            .map_or(false, Cancellable::is_cancelled)
    }

    /// Resolves when the caller cancels; never resolves when there is no
    /// cancellable to watch.
    pub(crate) async fn triggered(&self) {
        match &self.cancellable {
            Some(cancellable) => cancellable.cancelled().await,
            None => futures_lite::future::pending::<()>().await,
        }
    }

    /// Send `Close` for the request and disarm. The send is best effort:
    /// the call is terminating either way, so a failure is only logged.
    pub(crate) async fn close_request(&mut self) {
        if self.cancellable.take().is_none() {
            return;
        }
        log::debug!("closing portal request {}", self.request_path);
        if let Err(err) = self.transport.close(self.request_path).await {
            log::warn!("while closing portal request {}: {:#}", self.request_path, err);
        }
    }

    pub(crate) fn disarm(&mut self) {
        if self.is_armed() {
            log::trace!("disarming cancellation for {}", self.request_path);
            self.cancellable = None;
        }
    }
}

impl Drop for CancelBridge<'_> {
    fn drop(&mut self) {
        self.disarm();
    }
}
