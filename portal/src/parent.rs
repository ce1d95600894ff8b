//! Parent windows, so the portal can place its dialogs over the caller.
//!
//! Portal methods take the parent as a string handle such as `x11:3a00007`
//! or `wayland:<exported handle>`. Obtaining that handle can require an
//! asynchronous export step (e.g. xdg-foreign on Wayland), which the
//! toolkit embedding this crate provides through [`ParentWindow`].

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A window that can be exported as a portal parent handle.
#[async_trait]
pub trait ParentWindow: Send + Sync {
    /// Produce the handle string. Called at most once per portal call.
    async fn export(&self) -> Result<String>;

    /// Release whatever [`ParentWindow::export`] acquired. Called once the
    /// portal call has completed, and also when the call is cancelled while
    /// the export is still in progress. Not called when the export fails.
    /// Implementations that need to do async work here should schedule it
    /// rather than block.
    fn unexport(&self) {}
}

/// A handle that is already known and needs no export.
struct StaticHandle(String);

#[async_trait]
impl ParentWindow for StaticHandle {
    async fn export(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// The parent window of a portal call.
#[derive(Clone)]
pub struct Parent {
    window: Arc<dyn ParentWindow>,
}

impl Parent {
    pub fn x11(xid: u32) -> Self {
        Self::handle(format!("x11:{xid:x}"))
    }

    /// `handle` is the xdg-foreign handle already exported by the toolkit.
    pub fn wayland(handle: impl fmt::Display) -> Self {
        Self::handle(format!("wayland:{handle}"))
    }

    pub fn handle(handle: impl Into<String>) -> Self {
        Self::exporter(StaticHandle(handle.into()))
    }

    pub fn exporter(window: impl ParentWindow + 'static) -> Self {
        Self {
            window: Arc::new(window),
        }
    }
}

impl fmt::Debug for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parent").finish_non_exhaustive()
    }
}

/// The resolved parent handle of one portal call.
///
/// Owns the export: dropping it unexports the parent, exactly once.
pub(crate) struct ExportedParent {
    handle: String,
    window: Option<Arc<dyn ParentWindow>>,
}

impl ExportedParent {
    /// Resolve `parent`; no parent resolves to `""` without suspending.
    pub(crate) async fn resolve(parent: Option<Parent>) -> Result<Self> {
        let Some(parent) = parent else {
            return Ok(Self::none());
        };
        // Owns the export from the moment it starts: if this future is
        // dropped part way, e.g. because the call was cancelled, the window
        // is still unexported.
        let mut exported = Self {
            handle: String::new(),
            window: Some(Arc::clone(&parent.window)),
        };
        match parent.window.export().await {
            Ok(handle) => {
                log::trace!("exported parent window as {handle:?}");
                exported.handle = handle;
                Ok(exported)
            }
            Err(err) => {
                exported.window = None;
                Err(err)
            }
        }
    }

    pub(crate) fn none() -> Self {
        Self {
            handle: String::new(),
            window: None,
        }
    }

    pub(crate) fn handle(&self) -> &str {
        &self.handle
    }

    pub(crate) fn release(&mut self) {
        if let Some(window) = self.window.take() {
            log::trace!("unexporting parent window {:?}", self.handle);
            window.unexport();
        }
    }
}

impl Drop for ExportedParent {
    fn drop(&mut self) {
        self.release();
    }
}
