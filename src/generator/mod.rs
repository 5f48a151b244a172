//! SBML generator – serialize a [`Document`] to text, files and archives.
//!
//! This module provides:
//! - [`attributes`] – Typed values to canonical attribute text.
//! - [`xml_writer`] – Indented element writer with self-closing collapse.
//! - [`sbml_xml`] – Schema-ordered walk over the model tree.
//! - [`sink`] – Plain, gzip, zip and bzip2 file targets.

pub mod attributes;
pub mod sbml_xml;
pub mod sink;
pub mod xml_writer;

pub use sbml_xml::{SbmlElement, WriteContext, generate_document_xml};
pub use sink::{has_bzip2, has_zlib};

use crate::error::SbmlError;
use crate::model::Document;
use camino::Utf8Path;
use tracing::{error, instrument};

/// Serializer with optional program identification.
///
/// When a program name is set, every document written carries a
/// `<!-- Created by NAME version VERSION -->` comment after the XML
/// declaration.
#[derive(Debug, Clone, Default)]
pub struct SbmlWriter {
    program_name: Option<String>,
    program_version: Option<String>,
}

impl SbmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the program name; an empty string clears it. Always succeeds.
    pub fn set_program_name(&mut self, name: &str) -> bool {
        self.program_name = non_empty(name);
        true
    }

    /// Set the program version; an empty string clears it. Always succeeds.
    pub fn set_program_version(&mut self, version: &str) -> bool {
        self.program_version = non_empty(version);
        true
    }

    pub fn program_name(&self) -> Option<&str> {
        self.program_name.as_deref()
    }

    pub fn program_version(&self) -> Option<&str> {
        self.program_version.as_deref()
    }

    fn comment(&self) -> Option<String> {
        let name = self.program_name.as_deref()?;
        Some(match &self.program_version {
            Some(version) => format!("Created by {} version {}", name, version),
            None => format!("Created by {}", name),
        })
    }

    pub fn write_to_string(&self, doc: &Document) -> String {
        generate_document_xml(doc, self.comment().as_deref())
    }

    /// Write the document to `path`, compressed according to the extension.
    ///
    /// Returns `false` and appends one error to the document's log when the
    /// file cannot be produced.
    #[instrument(skip(self, doc))]
    pub fn write_to_file(&self, doc: &mut Document, path: &Utf8Path) -> bool {
        let text = self.write_to_string(doc);
        match sink::write_text(path, &text) {
            Ok(()) => true,
            Err(err) => {
                let code = err.code();
                let message = format!("{:#}", anyhow::Error::from(err));
                error!(error = %message, "failed to write SBML document");
                doc.log(SbmlError::new(code, message));
                false
            }
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Serialize the document with a default [`SbmlWriter`].
pub fn write_sbml_to_string(doc: &Document) -> String {
    SbmlWriter::new().write_to_string(doc)
}

/// Write the document to a file with a default [`SbmlWriter`].
pub fn write_sbml(doc: &mut Document, path: impl AsRef<Utf8Path>) -> bool {
    SbmlWriter::new().write_to_file(doc, path.as_ref())
}
