//! Error types for the Jack compiler.
//!
//! Front-end errors pass through unchanged; resolution and code generation
//! add their own kinds. Every variant with a location renders as a single
//! `line:col: ...` line.

use jack_analyzer::error::JackError;
use jack_analyzer::token::Span;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    /// Lexical or syntax error from the front end.
    #[error(transparent)]
    Front(#[from] JackError),

    /// Name declared twice in the same scope.
    #[error("{span}: symbol error: '{name}' is already defined in this scope")]
    DuplicateDefinition { name: String, span: Span },

    /// Variable used but not declared.
    #[error("{span}: code generation error: undefined variable '{name}'")]
    UndefinedVariable { name: String, span: Span },

    /// `let` target names a class or subroutine.
    #[error("{span}: code generation error: cannot assign to '{name}'")]
    NotAssignable { name: String, span: Span },

    #[error("{span}: code generation error: malformed call to '{name}': {reason}")]
    MalformedCall {
        name: String,
        span: Span,
        reason: String,
    },

    #[error(
        "{span}: code generation error: '{name}' expects {expected} argument(s), found {found}"
    )]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("{span}: code generation error: string constant does not fit the character set")]
    InvalidStringChar { span: Span },

    /// A count written into a VM command is past the Jack integer range.
    #[error("{span}: code generation error: too many {what} (at most {limit})")]
    TooMany {
        what: &'static str,
        limit: u16,
        span: Span,
    },

    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn undefined_variable(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            span,
        }
    }

    pub fn duplicate_definition(name: impl Into<String>, span: Span) -> Self {
        Self::DuplicateDefinition {
            name: name.into(),
            span,
        }
    }

    pub fn malformed_call(name: impl Into<String>, span: Span, reason: impl Into<String>) -> Self {
        Self::MalformedCall {
            name: name.into(),
            span,
            reason: reason.into(),
        }
    }

    pub fn span(&self) -> Option<&Span> {
        match self {
            CompileError::Front(e) => e.span(),
            CompileError::DuplicateDefinition { span, .. }
            | CompileError::UndefinedVariable { span, .. }
            | CompileError::NotAssignable { span, .. }
            | CompileError::MalformedCall { span, .. }
            | CompileError::ArityMismatch { span, .. }
            | CompileError::InvalidStringChar { span }
            | CompileError::TooMany { span, .. } => Some(span),
            CompileError::Io { .. } => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        self.span().map(|s| s.line)
    }
}
