//! JackAnalyzer CLI - writes `*T.xml` and `*.xml` for each `.jack` input.

use clap::Parser as ClapParser;
use jack_analyzer::{AnalysisResult, analyze_directory, analyze_file, write_results};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(ClapParser, Debug)]
#[command(name = "JackAnalyzer")]
#[command(version, about = "Syntax analyzer for the Jack programming language")]
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

    let (results, output_dir): (Vec<AnalysisResult>, PathBuf) = if args.input.is_file() {
        let output_dir = args.output.unwrap_or_else(|| {
            args.input
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default()
        });
        (vec![analyze_file(&args.input)], output_dir)
    } else if args.input.is_dir() {
        match analyze_directory(&args.input) {
            Ok(results) => (results, args.output.unwrap_or_else(|| args.input.clone())),
            Err(e) => {
                eprintln!("analyze: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        eprintln!("analyze: path not found: {}", args.input.display());
        return ExitCode::from(2);
    };

    if results.is_empty() {
        eprintln!("analyze: no .jack files in {}", args.input.display());
        return ExitCode::from(2);
    }

    let mut failed = false;
    for result in &results {
        let written = match &result.output {
            Ok(analysis) => write_results(result.stem(), analysis, &output_dir),
            Err(e) => {
                eprintln!("analyze: {}: {}", result.filename, e);
                failed = true;
                continue;
            }
        };
        match written {
            Ok((tokens, tree)) => {
                println!("{}", tokens.display());
                println!("{}", tree.display());
            }
            Err(e) => {
                eprintln!("analyze: {}: {}", result.filename, e);
                failed = true;
            }
        }
    }

    if args.verbose {
        eprintln!(
            "Analyzed {} file(s) in {:.2}ms",
            results.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
