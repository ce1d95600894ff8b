use crate::error::Result;
use crate::transport::{Response, Subscription, Transport};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

/// The token and object path naming one portal request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity {
    token: String,
    path: String,
}

impl RequestIdentity {
    /// Allocate a fresh identity under `prefix` for the bus client `sender`.
    ///
    /// The token combines a process-wide sequence number with a random
    /// component, so it is never reused by this process and is unlikely
    /// to collide with tokens chosen by other clients of the portal.
    pub fn allocate(prefix: &str, sender: &str) -> Self {
        let serial = NEXT_REQUEST.fetch_add(1, Ordering::Relaxed);
        let token = format!("portal{serial}_{:016x}", fastrand::u64(..));
        let path = format!("{prefix}/{sender}/{token}");
        Self { token, path }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Listens for the one `Response` of a request.
///
/// The subscription is released right after the first response, and in
/// any case when the listener is dropped.
pub(crate) struct ResponseListener {
    subscription: Subscription,
}

impl ResponseListener {
    pub(crate) async fn subscribe(transport: &dyn Transport, request_path: &str) -> Result<Self> {
        let subscription = transport.subscribe(request_path).await?;
        log::debug!("listening for response on {request_path}");
        Ok(Self { subscription })
    }

    /// Wait for the response. `None` means the subscription ended without
    /// one, e.g. because the bus connection went away.
    pub(crate) async fn response(&mut self) -> Option<Response> {
        let response = self.subscription.next().await;
        self.subscription.unsubscribe();
        response
    }

    pub(crate) fn unsubscribe(&mut self) {
        self.subscription.unsubscribe();
    }
}
