//! Error types for single-file component splitting.

use source_map::Span;
use std::fmt;

pub type ParseResult<T> = Result<T, ParseError>;

/// An error raised while splitting a component into blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub code: ErrorCode,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            span,
            code,
        }
    }

    pub fn unclosed_block(tag: &str, span: Span) -> Self {
        Self::new(
            format!("Unclosed block: <{}>", tag),
            span,
            ErrorCode::UnclosedBlock,
        )
    }

    pub fn duplicate_block(block: &str, span: Span) -> Self {
        Self::new(
            format!("Duplicate {} block", block),
            span,
            ErrorCode::DuplicateBlock,
        )
    }

    pub fn unterminated_tag(tag: &str, span: Span) -> Self {
        Self::new(
            format!("Missing `>` after <{}", tag),
            span,
            ErrorCode::UnterminatedTag,
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A block opened but never closed.
    UnclosedBlock,
    /// A second `<template>` or `<script>` block.
    DuplicateBlock,
    /// An opening tag without its closing `>`.
    UnterminatedTag,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnclosedBlock => "unclosed-block",
            ErrorCode::DuplicateBlock => "duplicate-block",
            ErrorCode::UnterminatedTag => "unterminated-tag",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
