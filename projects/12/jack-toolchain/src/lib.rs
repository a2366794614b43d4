//! Jack Toolchain - a directory of Jack classes to a runnable Hack binary.
//!
//! Runs the three stages in order and stops at the first failure:
//!
//! 1. compile every `.jack` file to a sibling `.vm` file
//! 2. link those with any other `.vm` files of the directory (OS classes,
//!    hand-written VM) into `<dir>/<dir>.asm`
//! 3. assemble that into `<dir>/<dir>.hack`
//!
//! A stage writes its outputs only after it succeeded, so a failure never
//! leaves a later stage's file behind.
//!
//! # Usage
//!
//! ```no_run
//! use jack_toolchain::{BuildOptions, build_directory};
//! use std::path::Path;
//!
//! let report = build_directory(Path::new("Pong/"), BuildOptions::default());
//! ```

pub mod error;

use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use vm_translator::{Bootstrap, TranslateOptions, VmUnit, translate_units};

pub use error::{Result, Stage, ToolchainError};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    pub bootstrap: Bootstrap,
}

/// A Jack class given as source text, named by its file stem.
#[derive(Debug, Clone)]
pub struct JackSource {
    pub name: String,
    pub source: String,
}

impl JackSource {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Outputs of every stage, kept in memory.
#[derive(Debug, Clone)]
pub struct Build {
    /// One unit per compiled class, in input order.
    pub vm: Vec<VmUnit>,
    pub asm: String,
    pub hack: String,
}

/// Files read and written by [`build_directory`].
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub vm_files: Vec<PathBuf>,
    /// Pre-existing `.vm` files linked alongside the compiled classes.
    pub linked: Vec<PathBuf>,
    pub asm: PathBuf,
    pub hack: PathBuf,
    pub instructions: usize,
}

// =============================================================================
// Stages
// =============================================================================

/// Compile classes in parallel. The error reported is the first one in
/// input order.
pub fn compile_units(sources: &[JackSource]) -> Result<Vec<VmUnit>> {
    let compiled: Vec<Result<VmUnit>> = sources
        .par_iter()
        .map(|class| {
            jack_compiler::compile_source(&class.source)
                .map(|vm| VmUnit::new(class.name.clone(), vm))
                .map_err(|source| ToolchainError::Compile {
                    file: format!("{}.jack", class.name),
                    source,
                })
        })
        .collect();
    compiled.into_iter().collect()
}

/// Translate a link unit to assembly. `asm_name` labels errors that belong
/// to no single unit.
pub fn link(units: &[VmUnit], options: BuildOptions, asm_name: &str) -> Result<String> {
    let options = TranslateOptions {
        bootstrap: options.bootstrap,
    };
    translate_units(units, options).map_err(|e| ToolchainError::translate(asm_name, e))
}

pub fn assemble(asm: &str, asm_name: &str) -> Result<String> {
    hack_assembler::assemble(asm).map_err(|source| ToolchainError::Assemble {
        file: asm_name.to_string(),
        source,
    })
}

/// Run the whole pipeline in memory. `vm` holds extra units linked with
/// the compiled classes.
pub fn build(
    program: &str,
    sources: &[JackSource],
    vm: &[VmUnit],
    options: BuildOptions,
) -> Result<Build> {
    let compiled = compile_units(sources)?;
    let mut units = compiled.clone();
    units.extend(vm.iter().cloned());

    let asm_name = format!("{}.asm", program);
    let asm = link(&units, options, &asm_name)?;
    let hack = assemble(&asm, &asm_name)?;
    Ok(Build {
        vm: compiled,
        asm,
        hack,
    })
}

// =============================================================================
// Directory mode
// =============================================================================

/// Files with the given extension directly inside `dir`, sorted by path.
fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| ToolchainError::io(dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == ext))
        .collect();
    files.sort();
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ToolchainError::io(path, e))
}

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| ToolchainError::io(path, e))
}

/// Build `dir/dir.hack` from the `.jack` and `.vm` files of `dir`.
///
/// A `.vm` file whose stem matches a `.jack` file is that class's previous
/// compiler output and is replaced, not linked twice.
pub fn build_directory(dir: &Path, options: BuildOptions) -> Result<BuildReport> {
    if !dir.is_dir() {
        return Err(ToolchainError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let jack_paths = files_with_extension(dir, "jack")?;
    if jack_paths.is_empty() {
        return Err(ToolchainError::NoJackFiles {
            path: dir.to_path_buf(),
        });
    }
    let sources = jack_paths
        .iter()
        .map(|path| Ok(JackSource::new(file_stem(path), read(path)?)))
        .collect::<Result<Vec<_>>>()?;

    let compiled = compile_units(&sources)?;
    let mut vm_files = Vec::with_capacity(compiled.len());
    for unit in &compiled {
        let path = dir.join(format!("{}.vm", unit.name));
        write(&path, &unit.source)?;
        vm_files.push(path);
    }

    let compiled_names: HashSet<String> = compiled.iter().map(|u| u.name.clone()).collect();
    let mut units = compiled;
    let mut linked = Vec::new();
    for path in files_with_extension(dir, "vm")? {
        let name = file_stem(&path);
        if compiled_names.contains(&name) {
            continue;
        }
        units.push(VmUnit::new(name, read(&path)?));
        linked.push(path);
    }

    let asm_path = vm_translator::output_path(dir);
    let asm_name = asm_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let asm = link(&units, options, &asm_name)?;
    write(&asm_path, &asm)?;

    let hack = assemble(&asm, &asm_name)?;
    let hack_path = hack_assembler::output_path(&asm_path);
    write(&hack_path, &hack)?;

    Ok(BuildReport {
        vm_files,
        linked,
        asm: asm_path,
        hack: hack_path,
        instructions: hack.lines().count(),
    })
}
