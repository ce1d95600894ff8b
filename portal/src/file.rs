//! Access to files outside the sandbox through a file chooser dialog.
//!
//! Selected files are made available to the application through the
//! document portal; the returned URIs point into its fuse filesystem.
//!
//! The underlying portal is `org.freedesktop.portal.FileChooser`.

use crate::call::{Action, PortalCall};
use crate::cancel::Cancellable;
use crate::error::{PortalError, Result};
use crate::parent::Parent;
use crate::results::{take_pairs, take_strings};
use crate::transport::{Options, Results};
use crate::Portal;
use std::path::Path;
use zvariant::Value;

const NAME: &str = "Filechooser";

/// One entry of a filter: a glob such as `*.png`, or a MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPattern {
    Glob(String),
    MimeType(String),
}

impl FilterPattern {
    fn as_tuple(&self) -> (u32, String) {
        match self {
            FilterPattern::Glob(glob) => (0, glob.clone()),
            FilterPattern::MimeType(mime) => (1, mime.clone()),
        }
    }
}

/// A named set of patterns the user can pick in the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub patterns: Vec<FilterPattern>,
}

impl FileFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            patterns: Vec::new(),
        }
    }

    pub fn glob(mut self, glob: impl Into<String>) -> Self {
        self.patterns.push(FilterPattern::Glob(glob.into()));
        self
    }

    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.patterns.push(FilterPattern::MimeType(mime.into()));
        self
    }

    fn as_tuple(&self) -> (String, Vec<(u32, String)>) {
        (
            self.name.clone(),
            self.patterns.iter().map(FilterPattern::as_tuple).collect(),
        )
    }
}

/// An extra widget in the dialog.
///
/// With no options the choice is a boolean, shown as a check button,
/// taking the values `"true"` and `"false"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: String,
    pub label: String,
    /// `(id, label)` pairs.
    pub options: Vec<(String, String)>,
    /// Initially selected option id; empty lets the portal decide.
    pub initial: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            options: Vec::new(),
            initial: String::new(),
        }
    }

    pub fn option(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push((id.into(), label.into()));
        self
    }

    pub fn initial(mut self, id: impl Into<String>) -> Self {
        self.initial = id.into();
        self
    }

    fn as_tuple(&self) -> (String, String, Vec<(String, String)>, String) {
        (
            self.id.clone(),
            self.label.clone(),
            self.options.clone(),
            self.initial.clone(),
        )
    }
}

/// What the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFiles {
    pub uris: Vec<String>,
    /// `(choice id, selected option)` for the choices passed in.
    pub choices: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Open { multiple: bool },
    Save,
}

/// Parameters of an open or save dialog.
#[derive(Debug, Clone)]
pub struct FileChooser {
    mode: Mode,
    title: String,
    modal: bool,
    filters: Vec<FileFilter>,
    choices: Vec<Choice>,
    current_name: Option<String>,
    current_folder: Option<Vec<u8>>,
    current_file: Option<Vec<u8>>,
}

impl FileChooser {
    pub fn open(title: impl Into<String>) -> Self {
        Self::with_mode(Mode::Open { multiple: false }, title.into())
    }

    pub fn save(title: impl Into<String>) -> Self {
        Self::with_mode(Mode::Save, title.into())
    }

    fn with_mode(mode: Mode, title: String) -> Self {
        Self {
            mode,
            title,
            modal: true,
            filters: Vec::new(),
            choices: Vec::new(),
            current_name: None,
            current_folder: None,
            current_file: None,
        }
    }

    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    /// Allow selecting more than one file. Ignored by save dialogs.
    pub fn multiple(mut self, multiple: bool) -> Self {
        if let Mode::Open { .. } = self.mode {
            self.mode = Mode::Open { multiple };
        }
        self
    }

    pub fn filter(mut self, filter: FileFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Suggested file name.
    pub fn current_name(mut self, name: impl Into<String>) -> Self {
        self.current_name = Some(name.into());
        self
    }

    /// Suggested folder to save the file in.
    pub fn current_folder(mut self, folder: impl AsRef<Path>) -> Self {
        self.current_folder = Some(path_bytes(folder.as_ref()));
        self
    }

    /// The file being saved, when saving an existing file.
    pub fn current_file(mut self, file: impl AsRef<Path>) -> Self {
        self.current_file = Some(path_bytes(file.as_ref()));
        self
    }
}

/// Paths travel as NUL terminated byte strings.
fn path_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    let mut bytes = path.as_os_str().as_bytes().to_vec();
    bytes.push(0);
    bytes
}

impl Action for FileChooser {
    type Output = SelectedFiles;

    fn name(&self) -> &'static str {
        NAME
    }

    fn interface(&self) -> &'static str {
        "org.freedesktop.portal.FileChooser"
    }

    fn method(&self) -> &'static str {
        match self.mode {
            Mode::Open { .. } => "OpenFile",
            Mode::Save => "SaveFile",
        }
    }

    fn marshal(
        &mut self,
        arguments: &mut Vec<Value<'static>>,
        options: &mut Options,
    ) -> Result<()> {
        arguments.push(Value::from(std::mem::take(&mut self.title)));

        options.insert("modal", self.modal);
        if let Mode::Open { multiple: true } = self.mode {
            options.insert("multiple", true);
        }
        if !self.filters.is_empty() {
            let filters: Vec<_> = self.filters.iter().map(FileFilter::as_tuple).collect();
            options.insert("filters", filters);
        }
        if !self.choices.is_empty() {
            let choices: Vec<_> = self.choices.iter().map(Choice::as_tuple).collect();
            options.insert("choices", choices);
        }
        if self.mode == Mode::Save {
            options.insert_some("current_name", self.current_name.take());
            options.insert_some("current_folder", self.current_folder.take());
            options.insert_some("current_file", self.current_file.take());
        }
        Ok(())
    }

    fn extract(self, mut results: Results) -> Result<SelectedFiles> {
        let uris = take_strings(&mut results, "uris")
            .ok_or_else(|| PortalError::missing(NAME, "Selected files"))?;
        Ok(SelectedFiles {
            uris,
            choices: take_pairs(&mut results, "choices").unwrap_or_default(),
        })
    }
}

impl Portal {
    /// Ask the user to open one or more files.
    pub fn open_file(
        &self,
        parent: Option<Parent>,
        chooser: FileChooser,
        cancellable: Option<&Cancellable>,
    ) -> PortalCall<FileChooser> {
        self.call(parent, chooser, cancellable)
    }

    /// Ask the user for a location to save a file.
    ///
    /// `chooser` should come from [`FileChooser::save`]; an open chooser
    /// is switched to save mode.
    pub fn save_file(
        &self,
        parent: Option<Parent>,
        mut chooser: FileChooser,
        cancellable: Option<&Cancellable>,
    ) -> PortalCall<FileChooser> {
        chooser.mode = Mode::Save;
        self.call(parent, chooser, cancellable)
    }
}
