//! Error types for the end-to-end build.
//!
//! Each variant names the stage that failed and the file it was working on,
//! and renders as `<stage>: <file>: <message>`.

use hack_assembler::error::AsmError;
use jack_compiler::CompileError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use vm_translator::VMError;

pub type Result<T> = std::result::Result<T, ToolchainError>;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Translate,
    Assemble,
    Io,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Compile => "compile",
            Stage::Translate => "translate",
            Stage::Assemble => "assemble",
            Stage::Io => "io",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("compile: {file}: {source}")]
    Compile {
        file: String,
        #[source]
        source: CompileError,
    },

    #[error("translate: {file}: {source}")]
    Translate {
        file: String,
        #[source]
        source: VMError,
    },

    #[error("assemble: {file}: {source}")]
    Assemble {
        file: String,
        #[source]
        source: AsmError,
    },

    #[error("io: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io: {}: no .jack files found", path.display())]
    NoJackFiles { path: PathBuf },

    #[error("io: {}: not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

impl ToolchainError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Translation errors point at the offending `.vm` unit when they can,
    /// otherwise at the program being linked.
    pub fn translate(program: &str, source: VMError) -> Self {
        let file = match source.location() {
            Some((unit, _)) => format!("{}.vm", unit),
            None => program.to_string(),
        };
        Self::Translate { file, source }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Compile { .. } => Stage::Compile,
            Self::Translate { .. } => Stage::Translate,
            Self::Assemble { .. } => Stage::Assemble,
            Self::Io { .. } | Self::NoJackFiles { .. } | Self::NotADirectory { .. } => Stage::Io,
        }
    }

    /// Name of the file the failing stage was working on.
    pub fn file(&self) -> String {
        match self {
            Self::Compile { file, .. }
            | Self::Translate { file, .. }
            | Self::Assemble { file, .. } => file.clone(),
            Self::Io { path, .. } | Self::NoJackFiles { path } | Self::NotADirectory { path } => {
                path.display().to_string()
            }
        }
    }
}
