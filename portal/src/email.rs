//! Composing email: the user is shown a compose window, optionally
//! pre-filled with an address, subject, body and attachments.
//!
//! The underlying portal is `org.freedesktop.portal.Email`.

use crate::call::{Action, PortalCall};
use crate::cancel::Cancellable;
use crate::error::{PortalError, Result};
use crate::parent::Parent;
use crate::transport::{Options, Results};
use crate::Portal;
use std::fs::{File, OpenOptions};
use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use zvariant::{Fd, Value};

#[cfg(target_os = "linux")]
const O_PATH: libc::c_int = libc::O_PATH;
#[cfg(not(target_os = "linux"))]
const O_PATH: libc::c_int = 0;

/// Open `path` for handing to the portal. Only the reference is passed,
/// so the file is opened for path operations where the platform allows.
pub(crate) fn open_path_fd(path: &Path) -> Result<OwnedFd> {
    let file: File = OpenOptions::new()
        .read(true)
        .custom_flags(O_PATH)
        .open(path)
        .map_err(|source| PortalError::Resource {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(file.into())
}

#[derive(Debug, Clone, Default)]
pub struct ComposeEmail {
    pub address: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub attachments: Vec<PathBuf>,
}

impl ComposeEmail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn attach(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }
}

impl Action for ComposeEmail {
    type Output = ();

    fn name(&self) -> &'static str {
        "Email"
    }

    fn interface(&self) -> &'static str {
        "org.freedesktop.portal.Email"
    }

    fn method(&self) -> &'static str {
        "ComposeEmail"
    }

    fn marshal(&mut self, _: &mut Vec<Value<'static>>, options: &mut Options) -> Result<()> {
        options.insert_some("address", self.address.take());
        options.insert_some("subject", self.subject.take());
        options.insert_some("body", self.body.take());

        // An attachment that can't be opened is dropped, not fatal.
        let fds: Vec<Fd<'static>> = self
            .attachments
            .iter()
            .filter_map(|path| match open_path_fd(path) {
                Ok(fd) => Some(Fd::from(fd)),
                Err(err) => {
                    log::warn!("{err}, skipping attachment");
                    None
                }
            })
            .collect();
        if !fds.is_empty() {
            options.insert("attachment_fds", fds);
        }
        Ok(())
    }

    fn extract(self, _: Results) -> Result<()> {
        Ok(())
    }
}

impl Portal {
    /// Present a window that lets the user compose an email.
    pub fn compose_email(
        &self,
        parent: Option<Parent>,
        email: ComposeEmail,
        cancellable: Option<&Cancellable>,
    ) -> PortalCall<ComposeEmail> {
        self.call(parent, email, cancellable)
    }
}
