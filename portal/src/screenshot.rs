//! Taking a screenshot, or picking the color of a pixel on screen.
//!
//! The underlying portal is `org.freedesktop.portal.Screenshot`.

use crate::call::{Action, PortalCall};
use crate::cancel::Cancellable;
use crate::error::{PortalError, Result};
use crate::parent::Parent;
use crate::results::{take, take_string};
use crate::transport::{Options, Results};
use crate::Portal;
use zvariant::Value;

const NAME: &str = "Screenshot";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screenshot {
    pub modal: bool,
    /// Let the user pick the area or window before the shot is taken.
    pub interactive: bool,
}

impl Default for Screenshot {
    fn default() -> Self {
        Self {
            modal: true,
            interactive: false,
        }
    }
}

impl Action for Screenshot {
    /// URI of the image file.
    type Output = String;

    fn name(&self) -> &'static str {
        NAME
    }

    fn interface(&self) -> &'static str {
        "org.freedesktop.portal.Screenshot"
    }

    fn method(&self) -> &'static str {
        "Screenshot"
    }

    fn marshal(&mut self, _: &mut Vec<Value<'static>>, options: &mut Options) -> Result<()> {
        options.insert("modal", self.modal);
        options.insert("interactive", self.interactive);
        Ok(())
    }

    fn extract(self, mut results: Results) -> Result<String> {
        take_string(&mut results, "uri").ok_or_else(|| PortalError::missing(NAME, "Screenshot"))
    }
}

/// An sRGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PickColor;

impl Action for PickColor {
    type Output = Color;

    fn name(&self) -> &'static str {
        NAME
    }

    fn interface(&self) -> &'static str {
        "org.freedesktop.portal.Screenshot"
    }

    fn method(&self) -> &'static str {
        "PickColor"
    }

    fn marshal(&mut self, _: &mut Vec<Value<'static>>, _: &mut Options) -> Result<()> {
        Ok(())
    }

    fn extract(self, mut results: Results) -> Result<Color> {
        let (red, green, blue) = take::<(f64, f64, f64)>(&mut results, "color")
            .ok_or_else(|| PortalError::missing(NAME, "Color"))?;
        Ok(Color { red, green, blue })
    }
}

impl Portal {
    /// Take a screenshot; the result is the URI of the image.
    pub fn take_screenshot(
        &self,
        parent: Option<Parent>,
        screenshot: Screenshot,
        cancellable: Option<&Cancellable>,
    ) -> PortalCall<Screenshot> {
        self.call(parent, screenshot, cancellable)
    }

    /// Let the user pick a color from the screen.
    pub fn pick_color(
        &self,
        parent: Option<Parent>,
        cancellable: Option<&Cancellable>,
    ) -> PortalCall<PickColor> {
        self.call(parent, PickColor, cancellable)
    }
}
