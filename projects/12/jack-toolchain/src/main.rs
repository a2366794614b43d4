//! JackToolchain CLI - builds a directory of Jack classes into a `.hack`
//! program.
//!
//! Usage:
//!     JackToolchain <directory> [-b auto|always|never] [-v]

use clap::Parser as ClapParser;
use jack_toolchain::{BuildOptions, build_directory};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use vm_translator::Bootstrap;

#[derive(ClapParser, Debug)]
#[command(name = "JackToolchain")]
#[command(version, about = "Jack directory to Hack binary: compile, translate, assemble")]
#[command(author = "nand2tetris")]
struct Args {
    /// Directory of .jack files, optionally with extra .vm files to link
    #[arg(value_name = "INPUT")]
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
        eprintln!("io: path not found: {}", args.input.display());
        return ExitCode::from(2);
    }

    let start = Instant::now();
    let options = BuildOptions {
        bootstrap: args.bootstrap,
    };

    match build_directory(&args.input, options) {
        Ok(report) => {
            for path in report.vm_files.iter().chain([&report.asm, &report.hack]) {
                println!("{}", path.display());
            }
            if args.verbose {
                for path in &report.linked {
                    eprintln!("  linked {}", path.display());
                }
                eprintln!(
                    "Built {} class(es), {} instructions in {:.2}ms",
                    report.vm_files.len(),
                    report.instructions,
                    start.elapsed().as_secs_f64() * 1000.0
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
