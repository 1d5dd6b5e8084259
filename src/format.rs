use std::{fmt, str::FromStr};

use thiserror::Error;

/// Output formats offered by the render command.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Format {
    Pdf,
    Docx,
    Html,
    Asciidoc,
    Docbook,
    Epub,
    Rst,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported output format: {0}")]
pub struct UnknownFormat(pub String);

impl Format {
    /// Catalog order, which is also the picker order.
    pub const ALL: [Format; 7] = [
        Format::Pdf,
        Format::Docx,
        Format::Html,
        Format::Asciidoc,
        Format::Docbook,
        Format::Epub,
        Format::Rst,
    ];

    /// Identifier used on the command line, in settings and as the output extension.
    pub fn id(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Docx => "docx",
            Format::Html => "html",
            Format::Asciidoc => "asciidoc",
            Format::Docbook => "docbook",
            Format::Epub => "epub",
            Format::Rst => "rst",
        }
    }

    /// Settings key holding the extra pandoc arguments for this format.
    pub fn options_key(self) -> &'static str {
        match self {
            Format::Pdf => "pdfOptString",
            Format::Docx => "docxOptString",
            Format::Html => "htmlOptString",
            Format::Asciidoc => "asciidocOptString",
            Format::Docbook => "docbookOptString",
            Format::Epub => "epubOptString",
            Format::Rst => "rstOptString",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Format::Pdf => "Render as pdf document",
            Format::Docx => "Render as word document",
            Format::Html => "Render as html document",
            Format::Asciidoc => "Render as asciidoc document",
            Format::Docbook => "Render as docbook document",
            Format::Epub => "Render as epub document",
            Format::Rst => "Render as rst document",
        }
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|f| f.id() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
