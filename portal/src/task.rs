use crate::call::{Action, PortalCall};
use crate::error::Result;
use async_executor::Executor;
use futures_lite::future;
use std::sync::{Once, OnceLock};

/// The executor behind [`PortalCall::start`]. Calls waiting on the portal
/// are suspended tasks here, so however many are outstanding they share
/// one thread.
fn executor() -> &'static Executor<'static> {
    static EXECUTOR: OnceLock<Executor<'static>> = OnceLock::new();
    static RUNNER: Once = Once::new();
    let executor = EXECUTOR.get_or_init(Executor::new);
    RUNNER.call_once(|| {
        let spawned = std::thread::Builder::new()
            .name("portal-calls".to_string())
            .spawn(move || async_io::block_on(executor.run(future::pending::<()>())));
        if let Err(err) = spawned {
            log::error!("while starting the portal call thread: {:#}", err);
        }
    });
    executor
}

/// The completed outcome of a call started with [`PortalCall::start`].
#[derive(Debug)]
pub struct AsyncResult<T> {
    action: &'static str,
    outcome: Result<T>,
}

impl<T> AsyncResult<T> {
    pub fn action(&self) -> &'static str {
        self.action
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(&self.outcome, Err(err) if err.is_cancelled())
    }

    /// Retrieve the typed result of the call.
    pub fn finish(self) -> Result<T> {
        self.outcome
    }
}

impl<A: Action> PortalCall<A> {
    /// Run the call in the background and hand its outcome to `callback`.
    ///
    /// `callback` runs exactly once, after every resource the call held
    /// has been released, so it is free to start another call. It runs on
    /// the thread shared by all started calls and should not block.
    pub fn start<F>(self, callback: F)
    where
        F: FnOnce(AsyncResult<A::Output>) + Send + 'static,
    {
        let action = self.action().name();
        executor()
            .spawn(async move {
                let outcome = self.run().await;
                if let Err(err) = &outcome {
                    if !err.is_cancelled() {
                        log::error!("while running portal call {action}: {:#}", err);
                    }
                }
                callback(AsyncResult { action, outcome });
            })
            .detach();
    }
}
