//! Diagnostic types for catalog construction and document rewriting.
//!
//! Nothing reported here is fatal: a diagnostic records that one document, reference, or
//! identifier could not be handled, while the rest of the corpus is still processed.

use serde::Serialize;
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// What went wrong, with the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A placeholder (or `set`/`counter` token) survived processing.
    UnresolvedPlaceholder { name: String },
    /// An identifier already claimed by an earlier document or element.
    DuplicateId { id: String },
    /// A fragment reference that no catalog key matches.
    IdNotFound { id: String },
    /// A fragment reference that more than one catalog key matches.
    AmbiguousId { id: String, matches: Vec<String> },
    /// The document could not be read as a tree.
    MalformedMarkup { message: String },
    /// The root element is not one of the topic categories.
    UnsupportedRoot { tag: String },
    /// The topic root carries no `id`.
    MissingTopicId,
    /// The image reference already starts with the images directory prefix.
    ImageAlreadyRewritten { href: String },
    /// The rewritten document could not be saved.
    WriteFailed { message: String },
}

impl DiagnosticKind {
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnresolvedPlaceholder { .. } => "unresolved placeholder",
            Self::DuplicateId { .. } => "duplicate identifier",
            Self::IdNotFound { .. } => "no matching identifier",
            Self::AmbiguousId { .. } => "ambiguous identifier",
            Self::MalformedMarkup { .. } => "malformed markup",
            Self::UnsupportedRoot { .. } => "unsupported root category",
            Self::MissingTopicId => "missing topic identifier",
            Self::ImageAlreadyRewritten { .. } => "already-rewritten image path",
            Self::WriteFailed { .. } => "write failure",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::UnresolvedPlaceholder { name } => format!("{{{name}}}"),
            Self::DuplicateId { id } | Self::IdNotFound { id } => id.clone(),
            Self::AmbiguousId { id, matches } => format!("{id} ({})", matches.join(", ")),
            Self::MalformedMarkup { message } | Self::WriteFailed { message } => message.clone(),
            Self::UnsupportedRoot { tag } => format!("<{tag}>"),
            Self::MissingTopicId => "root element has no id".to_string(),
            Self::ImageAlreadyRewritten { href } => href.clone(),
        }
    }
}

/// A one-line warning tied to a file, or to no file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(path: Option<&Path>, kind: DiagnosticKind) -> Self {
        Diagnostic {
            path: path.map(Path::to_path_buf),
            kind,
        }
    }

    pub fn for_file(path: &Path, kind: DiagnosticKind) -> Self {
        Diagnostic::new(Some(path), kind)
    }

    pub fn unresolved_placeholder(path: &Path, name: impl Into<String>) -> Self {
        Self::for_file(path, DiagnosticKind::UnresolvedPlaceholder { name: name.into() })
    }

    pub fn duplicate_id(path: &Path, id: impl Into<String>) -> Self {
        Self::for_file(path, DiagnosticKind::DuplicateId { id: id.into() })
    }

    pub fn id_not_found(path: &Path, id: impl Into<String>) -> Self {
        Self::for_file(path, DiagnosticKind::IdNotFound { id: id.into() })
    }

    pub fn ambiguous_id(path: &Path, id: impl Into<String>, matches: Vec<String>) -> Self {
        Self::for_file(
            path,
            DiagnosticKind::AmbiguousId {
                id: id.into(),
                matches,
            },
        )
    }

    pub fn malformed(path: Option<&Path>, message: impl Into<String>) -> Self {
        Self::new(
            path,
            DiagnosticKind::MalformedMarkup {
                message: message.into(),
            },
        )
    }

    pub fn category(&self) -> &'static str {
        self.kind.category()
    }

    /// Hand the diagnostic to the log output.
    pub fn emit(&self) {
        tracing::warn!("{}", self);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}", path.display())?,
            None => write!(f, "none")?,
        }
        write!(f, ": {}: {}", self.kind.category(), self.kind.detail())
    }
}
