//! Error types for template markup parsing.

use source_map::Span;
use std::fmt;

pub type DomResult<T> = Result<T, DomError>;

/// An error raised while parsing template markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomError {
    pub message: String,
    /// Span relative to the parsed fragment.
    pub span: Span,
    pub code: DomErrorCode,
}

impl DomError {
    pub fn new(message: impl Into<String>, span: Span, code: DomErrorCode) -> Self {
        Self {
            message: message.into(),
            span,
            code,
        }
    }

    pub fn unterminated_tag(tag: &str, span: Span) -> Self {
        Self::new(
            format!("Unterminated start tag <{}", tag),
            span,
            DomErrorCode::UnterminatedTag,
        )
    }

    pub fn unterminated_comment(span: Span) -> Self {
        Self::new(
            "Unterminated comment",
            span,
            DomErrorCode::UnterminatedComment,
        )
    }
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DomError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomErrorCode {
    /// End of input inside a start tag.
    UnterminatedTag,
    /// End of input inside `<!--`.
    UnterminatedComment,
}

impl DomErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomErrorCode::UnterminatedTag => "unterminated-tag",
            DomErrorCode::UnterminatedComment => "unterminated-comment",
        }
    }
}

impl fmt::Display for DomErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
