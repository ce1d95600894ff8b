//! Client side of the xdg desktop portal protocol.
//!
//! Every portal method that shows UI follows the same shape: the caller
//! names a parent window, the portal creates a request object at a path
//! derived from the caller's bus name and a token, and the outcome arrives
//! later as a single `Response` signal on that object. [`PortalCall`]
//! implements that lifecycle once; the modules below only describe how
//! each action marshals its options and reads its results.
//!
//! ```no_run
//! # async fn demo() -> portal::Result<()> {
//! let portal = portal::Portal::new().await?;
//! let color = portal.pick_color(None, None).await?;
//! println!("{color:?}");
//! # Ok(())
//! # }
//! ```

mod bridge;
mod results;

pub mod account;
pub mod call;
pub mod cancel;
pub mod config;
pub mod dbus;
pub mod email;
pub mod error;
pub mod file;
pub mod parent;
pub mod print;
pub mod request;
pub mod screenshot;
pub mod task;
pub mod transport;

pub use account::{GetUserInformation, UserInformation};
pub use call::{Action, CallState, PortalCall};
pub use cancel::Cancellable;
pub use config::PortalConfig;
pub use dbus::DbusTransport;
pub use email::ComposeEmail;
pub use error::{PortalError, Result};
pub use file::{Choice, FileChooser, FileFilter, FilterPattern, SelectedFiles};
pub use parent::{Parent, ParentWindow};
pub use print::{PreparePrint, PreparedPrint, PrintFile};
pub use screenshot::{Color, PickColor, Screenshot};
pub use task::AsyncResult;
pub use transport::{Response, Transport};

use std::sync::Arc;

/// Entry point for issuing portal requests.
///
/// Cheap to clone; clones share the underlying connection.
#[derive(Clone)]
pub struct Portal {
    transport: Arc<dyn Transport>,
    config: Arc<PortalConfig>,
}

impl Portal {
    /// Connect to the desktop portal on the session bus.
    pub async fn new() -> Result<Self> {
        Self::with_config(PortalConfig::default()).await
    }

    pub async fn with_config(config: PortalConfig) -> Result<Self> {
        let config = Arc::new(config.validate()?);
        let transport = DbusTransport::session(Arc::clone(&config)).await?;
        Ok(Self {
            transport: Arc::new(transport),
            config,
        })
    }

    /// Connect to a portal on the bus at `address`.
    pub async fn with_address(address: &str, config: PortalConfig) -> Result<Self> {
        let config = Arc::new(config.validate()?);
        let transport = DbusTransport::address(address, Arc::clone(&config)).await?;
        Ok(Self {
            transport: Arc::new(transport),
            config,
        })
    }

    /// Issue requests over `transport` instead of a bus connection.
    pub fn with_transport(transport: Arc<dyn Transport>, config: PortalConfig) -> Result<Self> {
        Ok(Self {
            transport,
            config: Arc::new(config.validate()?),
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub(crate) fn call<A: Action>(
        &self,
        parent: Option<Parent>,
        action: A,
        cancellable: Option<&Cancellable>,
    ) -> PortalCall<A> {
        PortalCall::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.config),
            parent,
            action,
            cancellable,
        )
    }
}

impl std::fmt::Debug for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portal")
            .field("sender", &self.transport.sender())
            .field("config", &self.config)
            .finish()
    }
}
