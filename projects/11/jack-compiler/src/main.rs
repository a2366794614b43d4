//! JackCompiler CLI - compiles `.jack` files to sibling `.vm` files.
//!
//! Usage:
//!     JackCompiler <file.jack | directory> [-o DIR] [-v]

use clap::Parser as ClapParser;
use jack_compiler::{CompileResult, compile_directory, compile_file, write_result};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(ClapParser, Debug)]
#[command(name = "JackCompiler")]
#[command(version, about = "Jack to VM code compiler")]
#[command(author = "nand2tetris")]
struct Args {
    /// Input file (.jack) or directory containing .jack files
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory (defaults to the input's directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let start = Instant::now();

    let (results, output_dir): (Vec<CompileResult>, PathBuf) = if args.input.is_file() {
        let output_dir = args.output.unwrap_or_else(|| {
            args.input
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default()
        });
        (vec![compile_file(&args.input)], output_dir)
    } else if args.input.is_dir() {
        match compile_directory(&args.input) {
            Ok(results) => (results, args.output.unwrap_or_else(|| args.input.clone())),
            Err(e) => {
                eprintln!("compile: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        eprintln!("compile: path not found: {}", args.input.display());
        return ExitCode::from(2);
    };

    if results.is_empty() {
        eprintln!("compile: no .jack files in {}", args.input.display());
        return ExitCode::from(2);
    }

    let mut has_errors = false;
    let mut commands = 0;

    for result in &results {
        let vm_code = match &result.output {
            Ok(vm_code) => vm_code,
            Err(e) => {
                eprintln!("compile: {}: {}", result.filename, e);
                has_errors = true;
                continue;
            }
        };
        match write_result(result.stem(), vm_code, &output_dir) {
            Ok(path) => {
                commands += vm_code.lines().count();
                println!("{}", path.display());
            }
            Err(e) => {
                eprintln!("compile: {}: {}", result.filename, e);
                has_errors = true;
            }
        }
    }

    if args.verbose {
        eprintln!(
            "Compiled {} file(s), {} VM commands in {:.2}ms",
            results.len(),
            commands,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    if has_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
