//! Printing: a print dialog that returns settings, and printing a file.
//!
//! The underlying portal is `org.freedesktop.portal.Print`.

use crate::call::{Action, PortalCall};
use crate::cancel::Cancellable;
use crate::email::open_path_fd;
use crate::error::{PortalError, Result};
use crate::parent::Parent;
use crate::results::{take_dict, take_u32};
use crate::transport::{Options, Results};
use crate::Portal;
use std::path::PathBuf;
use zvariant::{Fd, Value};

const NAME: &str = "Print";

/// Serialized print settings or page setup, as exchanged with the portal.
pub type PrintSettings = Results;

/// What the user set up in the print dialog.
#[derive(Debug)]
pub struct PreparedPrint {
    pub settings: PrintSettings,
    pub page_setup: PrintSettings,
    /// Pass to [`PrintFile::token`] to print without showing the dialog again.
    pub token: u32,
}

#[derive(Debug)]
pub struct PreparePrint {
    pub title: String,
    pub modal: bool,
    pub settings: Option<PrintSettings>,
    pub page_setup: Option<PrintSettings>,
}

impl PreparePrint {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            modal: true,
            settings: None,
            page_setup: None,
        }
    }
}

impl Action for PreparePrint {
    type Output = PreparedPrint;

    fn name(&self) -> &'static str {
        NAME
    }

    fn interface(&self) -> &'static str {
        "org.freedesktop.portal.Print"
    }

    fn method(&self) -> &'static str {
        "PreparePrint"
    }

    fn marshal(
        &mut self,
        arguments: &mut Vec<Value<'static>>,
        options: &mut Options,
    ) -> Result<()> {
        arguments.push(Value::from(std::mem::take(&mut self.title)));
        // Both mappings are positional, so absent ones go out empty.
        arguments.push(Value::from(self.settings.take().unwrap_or_default()));
        arguments.push(Value::from(self.page_setup.take().unwrap_or_default()));
        options.insert("modal", self.modal);
        Ok(())
    }

    fn extract(self, mut results: Results) -> Result<PreparedPrint> {
        Ok(PreparedPrint {
            settings: take_dict(&mut results, "settings")
                .ok_or_else(|| PortalError::missing(NAME, "Print settings"))?,
            page_setup: take_dict(&mut results, "page-setup")
                .ok_or_else(|| PortalError::missing(NAME, "Page setup"))?,
            token: take_u32(&mut results, "token")
                .ok_or_else(|| PortalError::missing(NAME, "Print token"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PrintFile {
    pub title: String,
    pub modal: bool,
    /// From [`PreparedPrint::token`], or 0 to show the print dialog.
    pub token: u32,
    pub file: PathBuf,
}

impl PrintFile {
    pub fn new(title: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            modal: true,
            token: 0,
            file: file.into(),
        }
    }

    pub fn token(mut self, token: u32) -> Self {
        self.token = token;
        self
    }
}

impl Action for PrintFile {
    type Output = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn interface(&self) -> &'static str {
        "org.freedesktop.portal.Print"
    }

    fn method(&self) -> &'static str {
        "Print"
    }

    fn marshal(
        &mut self,
        arguments: &mut Vec<Value<'static>>,
        options: &mut Options,
    ) -> Result<()> {
        // The document is the whole point of the call, so unlike email
        // attachments a file that can't be opened fails it.
        let fd = open_path_fd(&self.file)?;
        arguments.push(Value::from(std::mem::take(&mut self.title)));
        arguments.push(Value::from(Fd::from(fd)));
        options.insert("modal", self.modal);
        options.insert("token", self.token);
        Ok(())
    }

    fn extract(self, _: Results) -> Result<()> {
        Ok(())
    }
}

impl Portal {
    /// Show a print dialog and return the settings the user chose.
    pub fn prepare_print(
        &self,
        parent: Option<Parent>,
        prepare: PreparePrint,
        cancellable: Option<&Cancellable>,
    ) -> PortalCall<PreparePrint> {
        self.call(parent, prepare, cancellable)
    }

    /// Print a file, showing the print dialog unless a token from
    /// [`Portal::prepare_print`] is supplied.
    pub fn print_file(
        &self,
        parent: Option<Parent>,
        print: PrintFile,
        cancellable: Option<&Cancellable>,
    ) -> PortalCall<PrintFile> {
        self.call(parent, print, cancellable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::tests::owned;
    use std::collections::HashMap;

    #[test]
    fn prepare_print_sends_empty_mappings_when_unset() {
        let mut arguments = Vec::new();
        let mut options = Options::new();
        PreparePrint::new("Report")
            .marshal(&mut arguments, &mut options)
            .unwrap();
        k9::assert_equal!(arguments.len(), 3);
        k9::assert_equal!(arguments[0], Value::from("Report"));
        k9::assert_equal!(arguments[1].value_signature().as_str(), "a{sv}");
        k9::assert_equal!(options.get("modal"), Some(&Value::from(true)));
    }

    #[test]
    fn print_file_requires_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut arguments = Vec::new();
        let mut options = Options::new();
        let err = PrintFile::new("Report", dir.path().join("missing.pdf"))
            .marshal(&mut arguments, &mut options)
            .unwrap_err();
        assert!(matches!(err, PortalError::Resource { .. }));
        assert!(arguments.is_empty());
    }

    #[test]
    fn print_file_passes_fd_and_token() {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("report.pdf");
        std::fs::write(&document, b"%PDF-1.4").unwrap();
        let mut arguments = Vec::new();
        let mut options = Options::new();
        PrintFile::new("Report", &document)
            .token(7)
            .marshal(&mut arguments, &mut options)
            .unwrap();
        k9::assert_equal!(arguments.len(), 2);
        assert!(matches!(arguments[1], Value::Fd(_)));
        k9::assert_equal!(options.get("token"), Some(&Value::from(7u32)));
    }

    #[test]
    fn prepared_print_is_extracted() {
        let mut settings = HashMap::new();
        settings.insert("n-copies", Value::from("2"));
        let mut results = Results::new();
        results.insert("settings".to_string(), owned(settings));
        results.insert(
            "page-setup".to_string(),
            owned(HashMap::<&str, Value<'_>>::new()),
        );
        results.insert("token".to_string(), owned(7u32));
        let prepared = PreparePrint::new("t").extract(results).unwrap();
        k9::assert_equal!(prepared.token, 7);
        assert!(prepared.settings.contains_key("n-copies"));
    }
}
