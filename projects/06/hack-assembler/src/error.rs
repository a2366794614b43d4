use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsmError {
    #[error("line {line}: address out of range (max 32767): {value}")]
    AddressOutOfRange { line: usize, value: String },

    #[error("line {line}: symbol already defined: {symbol}")]
    DuplicateSymbol { line: usize, symbol: String },

    #[error("line {line}: invalid symbol: {symbol}")]
    InvalidSymbol { line: usize, symbol: String },

    #[error("line {line}: variable space exhausted at symbol: {symbol}")]
    SymbolOverflow { line: usize, symbol: String },

    #[error("line {line}: invalid syntax: {text}")]
    InvalidSyntax { line: usize, text: String },

    #[error("line {line}: invalid {field} mnemonic: {mnemonic}")]
    InvalidMnemonic {
        line: usize,
        field: &'static str,
        mnemonic: String,
    },

    #[error("{path}: cannot read: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: cannot write: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AsmError {
    /// Source line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            AsmError::AddressOutOfRange { line, .. }
            | AsmError::DuplicateSymbol { line, .. }
            | AsmError::InvalidSymbol { line, .. }
            | AsmError::SymbolOverflow { line, .. }
            | AsmError::InvalidSyntax { line, .. }
            | AsmError::InvalidMnemonic { line, .. } => Some(*line),
            AsmError::FileRead { .. } | AsmError::FileWrite { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AsmError>;
