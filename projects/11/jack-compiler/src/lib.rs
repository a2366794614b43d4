//! Jack Compiler - Jack classes to VM code.
//!
//! Each `.jack` file is tokenized and parsed by `jack_analyzer`, resolved
//! against a two-level symbol table, and lowered to VM commands. Files of a
//! directory are independent and compile in parallel.
//!
//! # Usage
//!
//! ```no_run
//! use jack_compiler::{compile_directory, compile_file};
//! use std::path::Path;
//!
//! // Compile a single file
//! let result = compile_file(Path::new("Main.jack"));
//!
//! // Compile a directory (parallel processing)
//! let results = compile_directory(Path::new("Square/"));
//! ```

pub mod codegen;
pub mod error;
pub mod resolver;
pub mod symbol_table;
pub mod vm_writer;

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub use codegen::CodeGenerator;
pub use error::{CompileError, Result};
pub use symbol_table::{Symbol, SymbolTable};
pub use vm_writer::VMWriter;

/// Result of compiling a single Jack file.
#[derive(Debug)]
pub struct CompileResult {
    /// The filename that was compiled.
    pub filename: String,
    /// Generated VM code.
    pub output: Result<String>,
}

impl CompileResult {
    pub fn is_ok(&self) -> bool {
        self.output.is_ok()
    }

    /// File name without the `.jack` extension.
    pub fn stem(&self) -> &str {
        self.filename
            .strip_suffix(".jack")
            .unwrap_or(&self.filename)
    }
}

/// Compile Jack source code directly.
pub fn compile_source(source: &str) -> Result<String> {
    let mut class = jack_analyzer::parse(source)?;
    resolver::resolve(&mut class)?;
    CodeGenerator::compile(&class)
}

/// Compile a single Jack file.
pub fn compile_file(path: &Path) -> CompileResult {
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let output = fs::read_to_string(path)
        .map_err(|e| CompileError::io(path, e))
        .and_then(|source| compile_source(&source));

    CompileResult { filename, output }
}

/// Compile all Jack files in a directory.
///
/// Results come back in file name order.
pub fn compile_directory(dir: &Path) -> Result<Vec<CompileResult>> {
    let files = jack_analyzer::jack_files(dir)?;
    Ok(files.par_iter().map(|path| compile_file(path)).collect())
}

/// Write `{stem}.vm` into `output_dir`, returning its path.
pub fn write_result(stem: &str, vm_code: &str, output_dir: &Path) -> Result<PathBuf> {
    let vm_path = output_dir.join(format!("{}.vm", stem));
    fs::write(&vm_path, vm_code).map_err(|e| CompileError::io(&vm_path, e))?;
    Ok(vm_path)
}
