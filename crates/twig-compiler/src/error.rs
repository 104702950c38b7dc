//! Conversion errors.

use source_map::Span;
use std::fmt;
use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

/// A fatal conversion error. Recoverable problems (unknown binding shapes,
/// broken style blocks) are logged and never reach the caller.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("The template file does not contain a template tag.")]
    MissingTemplate,

    #[error("Generating html during conversion process failed for {node}.")]
    Serialization { node: String },

    #[error("The variable {name} is already registered.")]
    DuplicateVariable { name: String },

    #[error("Failed to split the component: {0}")]
    Parse(#[from] vue_parser::ParseError),

    #[error("Failed to parse the template markup: {0}")]
    Markup(#[from] vue_dom::DomError),

    #[error("Found {directive} without a preceding v-if on <{tag}>.")]
    OrphanBranch { directive: String, tag: String },
}

impl ConvertError {
    pub fn kind(&self) -> ConvertErrorKind {
        match self {
            Self::MissingTemplate => ConvertErrorKind::MissingTemplate,
            Self::Serialization { .. } => ConvertErrorKind::Serialization,
            Self::DuplicateVariable { .. } => ConvertErrorKind::DuplicateVariable,
            Self::Parse(_) => ConvertErrorKind::Parse,
            Self::Markup(_) => ConvertErrorKind::Markup,
            Self::OrphanBranch { .. } => ConvertErrorKind::OrphanBranch,
        }
    }

    /// Location in the component source, for parse errors.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Parse(e) => Some(e.span),
            Self::Markup(e) => Some(e.span),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvertErrorKind {
    MissingTemplate,
    Serialization,
    DuplicateVariable,
    Parse,
    Markup,
    OrphanBranch,
}

impl ConvertErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTemplate => "missing-template",
            Self::Serialization => "serialization",
            Self::DuplicateVariable => "duplicate-variable",
            Self::Parse => "parse",
            Self::Markup => "markup",
            Self::OrphanBranch => "orphan-branch",
        }
    }
}

impl fmt::Display for ConvertErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
