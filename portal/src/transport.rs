//! The boundary between the request lifecycle and the bus it runs over.
//!
//! [`crate::dbus::DbusTransport`] is the real implementation; anything else
//! that can subscribe to a request's `Response`, send a method call and
//! send `Close` can stand in for it.

use crate::error::Result;
use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use std::collections::HashMap;
use std::fmt;
use zvariant::{OwnedValue, Value};

/// The `a{sv}` mapping carried by a `Response` signal.
pub type Results = HashMap<String, OwnedValue>;

/// Response code for a request that completed.
pub const RESPONSE_SUCCESS: u32 = 0;
/// Response code for a request the user dismissed.
pub const RESPONSE_CANCELLED: u32 = 1;

/// The single `Response` notification for one request.
#[derive(Debug)]
pub struct Response {
    pub code: u32,
    pub results: Results,
}

impl Response {
    pub fn new(code: u32, results: Results) -> Self {
        Self { code, results }
    }
}

/// The `a{sv}` options passed as the last argument of every portal method.
///
/// Optional fields are left out entirely rather than sent empty.
#[derive(Debug, Default)]
pub struct Options {
    entries: HashMap<&'static str, Value<'static>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: impl Into<Value<'static>>) {
        self.entries.insert(key, value.into());
    }

    pub fn insert_some<V: Into<Value<'static>>>(&mut self, key: &'static str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value<'static>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> HashMap<&'static str, Value<'static>> {
        self.entries
    }
}

/// A fully marshalled portal method call.
///
/// On the wire this is `(parent_handle, arguments..., options)`.
#[derive(Debug)]
pub struct Invocation {
    pub interface: &'static str,
    pub method: &'static str,
    pub parent_handle: String,
    pub arguments: Vec<Value<'static>>,
    pub options: Options,
}

impl Invocation {
    /// The request token the portal will use to name its request object.
    pub fn handle_token(&self) -> Option<&str> {
        match self.options.get("handle_token") {
            Some(Value::Str(token)) => Some(token.as_str()),
            _ => None,
        }
    }
}

/// An active subscription to the `Response` signal of one request path.
///
/// Dropping the subscription unsubscribes; [`Subscription::unsubscribe`]
/// does the same eagerly and is safe to call more than once.
pub struct Subscription {
    responses: Option<BoxStream<'static, Response>>,
    on_unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(responses: impl futures_util::Stream<Item = Response> + Send + 'static) -> Self {
        Self {
            responses: Some(responses.boxed()),
            on_unsubscribe: None,
        }
    }

    /// Run `func` when the subscription is released.
    pub fn on_unsubscribe(mut self, func: impl FnOnce() + Send + 'static) -> Self {
        self.on_unsubscribe = Some(Box::new(func));
        self
    }

    /// Wait for the next response. Yields `None` once unsubscribed or when
    /// the underlying stream ends.
    pub async fn next(&mut self) -> Option<Response> {
        match self.responses.as_mut() {
            Some(responses) => responses.next().await,
            None => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.responses.is_some()
    }

    pub fn unsubscribe(&mut self) {
        if self.responses.take().is_some() {
            if let Some(func) = self.on_unsubscribe.take() {
                func();
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Bus operations the request lifecycle depends on.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The caller's own bus identity as it appears in request paths.
    fn sender(&self) -> &str;

    /// Subscribe to `Response` on `request_path`, from the portal only.
    async fn subscribe(&self, request_path: &str) -> Result<Subscription>;

    /// Send the portal method call. Completing successfully only means the
    /// call was accepted; the outcome arrives as a `Response`.
    async fn invoke(&self, invocation: Invocation) -> Result<()>;

    /// Ask the portal to close the request object at `request_path`
    /// without waiting for a reply.
    async fn close(&self, request_path: &str) -> Result<()>;
}
