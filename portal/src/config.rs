use crate::error::{PortalError, Result};
use serde::Deserialize;

pub const PORTAL_BUS_NAME: &str = "org.freedesktop.portal.Desktop";
pub const PORTAL_OBJECT_PATH: &str = "/org/freedesktop/portal/desktop";
pub const REQUEST_PATH_PREFIX: &str = "/org/freedesktop/portal/desktop/request";
pub const SESSION_PATH_PREFIX: &str = "/org/freedesktop/portal/desktop/session";
pub const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// Where the portal lives on the bus.
///
/// The defaults address the real desktop portal; embedders and tests can
/// point the client at another implementation of the same protocol.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub bus_name: String,
    pub object_path: String,
    pub request_path_prefix: String,
    /// Not used by any of the request/response actions; kept so stateful
    /// capabilities can derive their session paths from the same place.
    pub session_path_prefix: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            bus_name: PORTAL_BUS_NAME.to_string(),
            object_path: PORTAL_OBJECT_PATH.to_string(),
            request_path_prefix: REQUEST_PATH_PREFIX.to_string(),
            session_path_prefix: SESSION_PATH_PREFIX.to_string(),
        }
    }
}

impl PortalConfig {
    pub fn with_bus_name(mut self, bus_name: impl Into<String>) -> Self {
        self.bus_name = bus_name.into();
        self
    }

    /// Check the configuration and strip trailing slashes from the path
    /// prefixes so request paths can be joined with a single `/`.
    pub fn validate(mut self) -> Result<Self> {
        if self.bus_name.is_empty() {
            return Err(PortalError::Config("bus_name is empty".to_string()));
        }
        for (name, path) in [
            ("object_path", &mut self.object_path),
            ("request_path_prefix", &mut self.request_path_prefix),
            ("session_path_prefix", &mut self.session_path_prefix),
        ] {
            if !path.starts_with('/') {
                return Err(PortalError::Config(format!(
                    "{name} must be an absolute object path, got {path:?}"
                )));
            }
            while path.len() > 1 && path.ends_with('/') {
                path.pop();
            }
        }
        Ok(self)
    }
}
