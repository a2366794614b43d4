//! Error types for VM translation.
//!
//! Parse errors carry the translation unit name and line number.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VMError {
    #[error("{file}:{line}: invalid command: {command}")]
    InvalidCommand {
        line: usize,
        file: String,
        command: String,
    },

    #[error("{file}:{line}: invalid segment: {segment}")]
    InvalidSegment {
        line: usize,
        file: String,
        segment: String,
    },

    #[error("{file}:{line}: index {index} out of range for segment {segment}")]
    IndexOutOfRange {
        line: usize,
        file: String,
        index: u16,
        segment: &'static str,
    },

    #[error("{file}:{line}: negative index: {value}")]
    NegativeIndex {
        line: usize,
        file: String,
        value: String,
    },

    #[error("{file}:{line}: cannot pop to constant segment")]
    PopToConstant { line: usize, file: String },

    #[error("{file}:{line}: missing argument for {command}")]
    MissingArgument {
        line: usize,
        file: String,
        command: String,
    },

    #[error("{file}:{line}: unexpected argument for {command}: {argument}")]
    UnexpectedArgument {
        line: usize,
        file: String,
        command: String,
        argument: String,
    },

    #[error("{file}:{line}: invalid number: {value}")]
    InvalidNumber {
        line: usize,
        file: String,
        value: String,
    },

    #[error("{file}:{line}: invalid label name: {name}")]
    InvalidLabelName {
        line: usize,
        file: String,
        name: String,
    },

    #[error("{file}:{line}: invalid function name: {name}")]
    InvalidFunctionName {
        line: usize,
        file: String,
        name: String,
    },

    #[error("invalid translation unit name: {name}")]
    InvalidUnitName { name: String },

    #[error("duplicate translation unit name: {name}")]
    DuplicateUnit { name: String },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no .vm files found in directory: {path}")]
    NoVmFiles { path: String },

    #[error("path is not a .vm file or directory: {path}")]
    InvalidPath { path: String },
}

impl VMError {
    /// `(file, line)` of the offending command, for parse errors.
    pub fn location(&self) -> Option<(&str, usize)> {
        match self {
            VMError::InvalidCommand { file, line, .. }
            | VMError::InvalidSegment { file, line, .. }
            | VMError::IndexOutOfRange { file, line, .. }
            | VMError::NegativeIndex { file, line, .. }
            | VMError::PopToConstant { file, line }
            | VMError::MissingArgument { file, line, .. }
            | VMError::UnexpectedArgument { file, line, .. }
            | VMError::InvalidNumber { file, line, .. }
            | VMError::InvalidLabelName { file, line, .. }
            | VMError::InvalidFunctionName { file, line, .. } => Some((file, *line)),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VMError>;
