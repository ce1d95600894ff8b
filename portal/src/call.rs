use crate::bridge::CancelBridge;
use crate::cancel::Cancellable;
use crate::config::PortalConfig;
use crate::error::{PortalError, Result};
use crate::parent::{ExportedParent, Parent};
use crate::request::{RequestIdentity, ResponseListener};
use crate::transport::{
    Invocation, Options, Response, Results, Transport, RESPONSE_CANCELLED, RESPONSE_SUCCESS,
};
use futures_lite::future;
use futures_util::future::{BoxFuture, FutureExt};
use std::future::IntoFuture;
use std::sync::Arc;
use zvariant::Value;

/// One kind of portal request: what to call and how to read the answer.
pub trait Action: Send + 'static {
    type Output: Send + 'static;

    /// Used in error messages, e.g. "Screenshot canceled".
    fn name(&self) -> &'static str;

    fn interface(&self) -> &'static str;

    fn method(&self) -> &'static str;

    /// Fill in the positional arguments that go between the parent handle
    /// and the options, and the options themselves. `handle_token` is
    /// already set.
    fn marshal(&mut self, arguments: &mut Vec<Value<'static>>, options: &mut Options)
        -> Result<()>;

    /// Map the results of a successful response to the action's output.
    /// A result the action requires but did not get is an error.
    fn extract(self, results: Results) -> Result<Self::Output>;
}

/// Progress of a portal call. Calls move through these in order and
/// never go back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CallState {
    ResolvingParent,
    Issuing,
    AwaitingResponse,
    Completed,
}

struct Progress {
    action: &'static str,
    state: CallState,
}

impl Progress {
    fn new(action: &'static str) -> Self {
        Self {
            action,
            state: CallState::ResolvingParent,
        }
    }

    fn advance(&mut self, next: CallState) {
        debug_assert!(next > self.state, "{:?} after {:?}", next, self.state);
        log::trace!("{}: {:?} -> {:?}", self.action, self.state, next);
        self.state = next;
    }
}

enum Wake {
    Responded(Response),
    Cancelled,
}

/// Apply the response code policy shared by every action.
pub fn complete<A: Action>(action: A, response: Response) -> Result<A::Output> {
    match response.code {
        RESPONSE_SUCCESS => action.extract(response.results),
        RESPONSE_CANCELLED => Err(PortalError::cancelled(action.name())),
        code => Err(PortalError::Failed {
            action: action.name(),
            code,
        }),
    }
}

/// A portal request that has been described but not yet sent.
///
/// Await it to run it, or hand it a callback with [`PortalCall::start`].
pub struct PortalCall<A: Action> {
    transport: Arc<dyn Transport>,
    config: Arc<PortalConfig>,
    parent: Option<Parent>,
    action: A,
    cancellable: Option<Cancellable>,
}

impl<A: Action> PortalCall<A> {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: Arc<PortalConfig>,
        parent: Option<Parent>,
        action: A,
        cancellable: Option<&Cancellable>,
    ) -> Self {
        Self {
            transport,
            config,
            parent,
            action,
            cancellable: cancellable.cloned(),
        }
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    /// Drive the request to completion.
    ///
    /// The listener, the cancellation bridge and the parent export are all
    /// released before this returns, whichever way the call ends.
    pub async fn run(self) -> Result<A::Output> {
        let PortalCall {
            transport,
            config,
            parent,
            mut action,
            cancellable,
        } = self;
        let name = action.name();
        let mut progress = Progress::new(name);

        let mut parent = resolve_parent(name, parent, cancellable.as_ref()).await?;

        progress.advance(CallState::Issuing);
        let identity = RequestIdentity::allocate(&config.request_path_prefix, transport.sender());
        let mut listener = ResponseListener::subscribe(&*transport, identity.path()).await?;
        let mut bridge = CancelBridge::arm(&*transport, identity.path(), cancellable.as_ref());

        let outcome = async {
            if bridge.is_triggered() {
                log::debug!("{name} cancelled before the request was sent");
                bridge.disarm();
                return Err(PortalError::cancelled(name));
            }

            let mut arguments = Vec::new();
            let mut options = Options::new();
            options.insert("handle_token", identity.token().to_string());
            action.marshal(&mut arguments, &mut options)?;
            let invocation = Invocation {
                interface: action.interface(),
                method: action.method(),
                parent_handle: parent.handle().to_string(),
                arguments,
                options,
            };
            log::debug!(
                "{name}: calling {}.{} as {}",
                invocation.interface,
                invocation.method,
                identity.path()
            );

            // The response branch is polled first, so a response that is
            // already queued wins over a cancellation racing it.
            let wake = future::or(
                async {
                    transport.invoke(invocation).await?;
                    progress.advance(CallState::AwaitingResponse);
                    match listener.response().await {
                        Some(response) => Ok(Wake::Responded(response)),
                        None => Err(PortalError::transport(format!(
                            "response channel for {} closed",
                            identity.path()
                        ))),
                    }
                },
                async {
                    bridge.triggered().await;
                    Ok::<_, PortalError>(Wake::Cancelled)
                },
            )
            .await?;

            match wake {
                Wake::Responded(response) => {
                    bridge.disarm();
                    complete(action, response)
                }
                Wake::Cancelled => {
                    bridge.close_request().await;
                    Err(PortalError::cancelled(name))
                }
            }
        }
        .await;

        progress.advance(CallState::Completed);
        bridge.disarm();
        listener.unsubscribe();
        parent.release();
        if let Err(err) = &outcome {
            log::debug!("{name}: {err:#}");
        }
        outcome
    }
}

async fn resolve_parent(
    name: &'static str,
    parent: Option<Parent>,
    cancellable: Option<&Cancellable>,
) -> Result<ExportedParent> {
    let Some(cancellable) = cancellable else {
        return ExportedParent::resolve(parent).await;
    };
    future::or(ExportedParent::resolve(parent), async {
        cancellable.cancelled().await;
        log::debug!("{name} cancelled while exporting the parent window");
        Err(PortalError::cancelled(name))
    })
    .await
}

impl<A: Action> IntoFuture for PortalCall<A> {
    type Output = Result<A::Output>;
    type IntoFuture = BoxFuture<'static, Result<A::Output>>;

    fn into_future(self) -> Self::IntoFuture {
        self.run().boxed()
    }
}
