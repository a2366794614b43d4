use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use hack_assembler::assemble_file;

/// Hack assembler - translates .asm files to .hack binary text
#[derive(Parser, Debug)]
#[command(name = "hack-assembler")]
#[command(version, about, long_about = None)]
struct Args {
    /// Input .asm files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let mut errors = 0;

    for file in &args.files {
        let start = Instant::now();
        if args.verbose {
            eprintln!("Assembling: {}", file.display());
        }

        match assemble_file(file) {
            Ok(out) => {
                if args.verbose {
                    eprintln!(
                        "  ✓ done in {:.2}ms -> {}",
                        start.elapsed().as_secs_f64() * 1000.0,
                        out.display()
                    );
                } else {
                    println!("{} -> {}", file.display(), out.display());
                }
            }
            Err(e) => {
                eprintln!("assemble: {}: {}", file.display(), e);
                errors += 1;
            }
        }
    }

    if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
