//! Basic information about the user: id, real name and avatar.
//!
//! The underlying portal is `org.freedesktop.portal.Account`.

use crate::call::{Action, PortalCall};
use crate::cancel::Cancellable;
use crate::error::{PortalError, Result};
use crate::parent::Parent;
use crate::results::take_string;
use crate::transport::{Options, Results};
use crate::Portal;
use zvariant::Value;

const NAME: &str = "Account";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInformation {
    pub id: String,
    pub name: String,
    /// URI of the avatar picture, when the user has one.
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GetUserInformation {
    /// Shown in the dialog to explain why the information is needed.
    pub reason: Option<String>,
}

impl Action for GetUserInformation {
    type Output = UserInformation;

    fn name(&self) -> &'static str {
        NAME
    }

    fn interface(&self) -> &'static str {
        "org.freedesktop.portal.Account"
    }

    fn method(&self) -> &'static str {
        "GetUserInformation"
    }

    fn marshal(&mut self, _: &mut Vec<Value<'static>>, options: &mut Options) -> Result<()> {
        options.insert_some("reason", self.reason.take());
        Ok(())
    }

    fn extract(self, mut results: Results) -> Result<UserInformation> {
        Ok(UserInformation {
            id: take_string(&mut results, "id")
                .ok_or_else(|| PortalError::missing(NAME, "User id"))?,
            name: take_string(&mut results, "name")
                .ok_or_else(|| PortalError::missing(NAME, "User name"))?,
            image: take_string(&mut results, "image"),
        })
    }
}

impl Portal {
    /// Ask the user to share their basic information.
    pub fn get_user_information(
        &self,
        parent: Option<Parent>,
        reason: Option<&str>,
        cancellable: Option<&Cancellable>,
    ) -> PortalCall<GetUserInformation> {
        self.call(
            parent,
            GetUserInformation {
                reason: reason.map(str::to_string),
            },
            cancellable,
        )
    }
}
