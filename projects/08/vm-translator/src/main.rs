//! VM Translator CLI
//!
//! ```bash
//! # Single file
//! vm-translator SimpleAdd.vm
//!
//! # Directory (bootstrap when Sys.init is defined)
//! vm-translator FibonacciElement/
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use vm_translator::{Bootstrap, TranslateOptions, translate_path, vm_files};

/// VM translator - translates .vm files to Hack assembly
#[derive(Parser, Debug)]
#[command(name = "vm-translator")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input .vm file or directory of .vm files
    input: PathBuf,

    /// When to emit the SP=256 / call Sys.init bootstrap
    #[arg(short, long, value_enum, default_value_t = Bootstrap::Auto)]
    bootstrap: Bootstrap,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if !args.input.exists() {
        eprintln!("translate: path not found: {}", args.input.display());
        return ExitCode::from(2);
    }

    if args.verbose && args.input.is_dir() {
        eprintln!("Translating directory: {}", args.input.display());
        if let Ok(files) = vm_files(&args.input) {
            eprintln!("Found {} .vm files:", files.len());
            for f in &files {
                eprintln!(
                    "  - {}",
                    f.file_name().unwrap_or_default().to_string_lossy()
                );
            }
        }
    }

    let start = Instant::now();
    let options = TranslateOptions {
        bootstrap: args.bootstrap,
    };

    match translate_path(&args.input, options) {
        Ok(output) => {
            if args.verbose {
                eprintln!(
                    "Translated -> {} ({:.2}ms)",
                    output.display(),
                    start.elapsed().as_secs_f64() * 1000.0
                );
            }
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("translate: {}", e);
            ExitCode::FAILURE
        }
    }
}
