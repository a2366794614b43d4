//! VM Translator - VM code to Hack assembly
//!
//! Translates VM code (.vm) to Hack assembly (.asm). A link unit is one or
//! more translation units concatenated into a single `.asm` output.
//!
//! # Usage Modes
//!
//! - Single source: [`translate`] - no bootstrap
//! - Link unit: [`translate_units`] / [`translate_directory`] - bootstrap per
//!   [`Bootstrap`]

pub mod bootstrap;
pub mod codegen;
pub mod error;
pub mod memory;
pub mod parser;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bootstrap::write_bootstrap;
use crate::codegen::CodeGenerator;
pub use crate::error::{Result, VMError};
use crate::parser::{SourceCommand, VMCommand, is_valid_identifier, parse_source};

/// Function the bootstrap transfers control to.
pub const ENTRY_POINT: &str = "Sys.init";

/// When to emit the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Bootstrap {
    /// Emit it when the link unit defines `Sys.init`
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TranslateOptions {
    pub bootstrap: Bootstrap,
}

/// One `.vm` translation unit.
#[derive(Debug, Clone)]
pub struct VmUnit {
    /// File stem; names the unit's statics and comparison labels.
    pub name: String,
    pub source: String,
}

impl VmUnit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Unit names prefix statics and labels, so they follow the VM identifier
/// rules.
fn check_unit_name(name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(VMError::InvalidUnitName {
            name: name.to_string(),
        })
    }
}

/// Translate a single VM source string without bootstrap.
pub fn translate(source: &str, filename: &str) -> Result<String> {
    check_unit_name(filename)?;
    let commands = parse_source(source, filename)?;
    let mut codegen = CodeGenerator::new();
    let mut output = String::with_capacity(commands.len() * 50);
    for cmd in &commands {
        codegen.translate(cmd, &mut output);
    }
    Ok(output)
}

fn defines_entry_point(commands: &[SourceCommand]) -> bool {
    commands
        .iter()
        .any(|c| matches!(&c.command, VMCommand::Function { name, .. } if name == ENTRY_POINT))
}

/// Translate a link unit into one assembly program.
///
/// Unit names must be unique. `Sys` is translated first, the rest in name
/// order.
pub fn translate_units(units: &[VmUnit], options: TranslateOptions) -> Result<String> {
    let mut seen = HashSet::new();
    for unit in units {
        check_unit_name(&unit.name)?;
        if !seen.insert(unit.name.as_str()) {
            return Err(VMError::DuplicateUnit {
                name: unit.name.clone(),
            });
        }
    }

    let mut ordered: Vec<&VmUnit> = units.iter().collect();
    ordered.sort_by(|a, b| (a.name != "Sys", &a.name).cmp(&(b.name != "Sys", &b.name)));

    let parsed = ordered
        .iter()
        .map(|unit| parse_source(&unit.source, &unit.name))
        .collect::<Result<Vec<_>>>()?;

    let emit_bootstrap = match options.bootstrap {
        Bootstrap::Always => true,
        Bootstrap::Never => false,
        Bootstrap::Auto => parsed.iter().any(|cmds| defines_entry_point(cmds)),
    };

    let total: usize = parsed.iter().map(Vec::len).sum();
    let mut output = String::with_capacity(total * 50 + 512);
    let mut codegen = CodeGenerator::new();

    if emit_bootstrap {
        write_bootstrap(&mut codegen, &mut output);
    }

    for commands in &parsed {
        codegen.start_unit();
        for cmd in commands {
            codegen.translate(cmd, &mut output);
        }
    }

    Ok(output)
}

fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn read_unit(path: &Path) -> Result<VmUnit> {
    let source = fs::read_to_string(path).map_err(|e| VMError::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(VmUnit::new(unit_name(path), source))
}

/// All `.vm` files directly inside `dir`, sorted by path.
pub fn vm_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| VMError::FileRead {
            path: dir.display().to_string(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "vm"))
        .collect();
    files.sort();
    Ok(files)
}

/// Translate a single .vm file.
pub fn translate_file(path: &Path, options: TranslateOptions) -> Result<String> {
    translate_units(&[read_unit(path)?], options)
}

/// Translate every .vm file of a directory as one link unit.
pub fn translate_directory(dir_path: &Path, options: TranslateOptions) -> Result<String> {
    let files = vm_files(dir_path)?;
    if files.is_empty() {
        return Err(VMError::NoVmFiles {
            path: dir_path.display().to_string(),
        });
    }
    let units = files
        .iter()
        .map(|f| read_unit(f))
        .collect::<Result<Vec<_>>>()?;
    translate_units(&units, options)
}

/// Determine the output filename for a given input.
///
/// - Single file: Input.vm -> Input.asm
/// - Directory: dir/ -> dir/dir.asm
pub fn output_path(input: &Path) -> PathBuf {
    if input.is_dir() {
        let dir_name = input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        input.join(format!("{}.asm", dir_name))
    } else {
        input.with_extension("asm")
    }
}

/// Translate a file or directory and write the `.asm` output. Nothing is
/// written when translation fails.
pub fn translate_path(input: &Path, options: TranslateOptions) -> Result<PathBuf> {
    let asm = if input.is_dir() {
        translate_directory(input, options)?
    } else if input.extension().is_some_and(|ext| ext == "vm") {
        translate_file(input, options)?
    } else {
        return Err(VMError::InvalidPath {
            path: input.display().to_string(),
        });
    };

    let output = output_path(input);
    fs::write(&output, &asm).map_err(|e| VMError::FileWrite {
        path: output.display().to_string(),
        source: e,
    })?;
    Ok(output)
}
