use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = PortalError> = std::result::Result<T, E>;

/// Terminal failure of a portal call.
///
/// Every outcome other than success is reported through this type,
/// including the user dismissing the dialog; use
/// [`PortalError::is_cancelled`] to tell the two apart.
#[derive(Debug, Error)]
pub enum PortalError {
    /// The portal answered with response code 1, or the caller's
    /// cancellable fired before a response arrived.
    #[error("{action} canceled")]
    Cancelled { action: &'static str },
    /// The portal answered with a response code other than 0 or 1.
    #[error("{action} failed")]
    Failed { action: &'static str, code: u32 },
    /// The portal reported success but left out a field the action needs.
    #[error("{what} not received")]
    MissingResult {
        action: &'static str,
        what: &'static str,
    },
    #[error("failed to export parent window: {0}")]
    ParentExport(String),
    #[error("failed to open {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("portal transport error: {0}")]
    Transport(String),
    #[error("invalid portal configuration: {0}")]
    Config(String),
}

impl PortalError {
    pub fn cancelled(action: &'static str) -> Self {
        PortalError::Cancelled { action }
    }

    pub fn missing(action: &'static str, what: &'static str) -> Self {
        PortalError::MissingResult { action, what }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        PortalError::Transport(reason.into())
    }

    /// True when the call ended because it was dismissed or cancelled
    /// rather than because something went wrong.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PortalError::Cancelled { .. })
    }
}

impl From<zbus::Error> for PortalError {
    fn from(err: zbus::Error) -> Self {
        PortalError::Transport(err.to_string())
    }
}

impl From<zvariant::Error> for PortalError {
    fn from(err: zvariant::Error) -> Self {
        PortalError::Transport(err.to_string())
    }
}
