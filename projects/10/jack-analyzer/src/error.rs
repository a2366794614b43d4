//! Error types for the Jack front end.
//!
//! Tokenizing and parsing stop at the first error, so each stage returns a
//! single [`JackError`].

use crate::token::Span;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JackError>;

#[derive(Debug, Error)]
pub enum JackError {
    #[error("{span}: lexical error: {message}")]
    Lexical { span: Span, message: String },

    #[error("{span}: syntax error: expected {expected}, found {found}")]
    Syntax {
        span: Span,
        expected: String,
        found: String,
    },

    #[error("{span}: syntax error: expression nesting deeper than {limit}")]
    NestingTooDeep { span: Span, limit: usize },

    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JackError {
    pub fn lexical(span: Span, message: impl Into<String>) -> Self {
        JackError::Lexical {
            span,
            message: message.into(),
        }
    }

    pub fn syntax(span: Span, expected: impl Into<String>, found: impl Into<String>) -> Self {
        JackError::Syntax {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JackError::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the span of this error, if any.
    pub fn span(&self) -> Option<&Span> {
        match self {
            JackError::Lexical { span, .. }
            | JackError::Syntax { span, .. }
            | JackError::NestingTooDeep { span, .. } => Some(span),
            JackError::Io { .. } => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        self.span().map(|s| s.line)
    }
}
