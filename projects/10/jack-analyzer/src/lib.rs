//! Jack Analyzer - front end for the Jack programming language.
//!
//! Lexical analysis (tokenization) and syntactic analysis (parsing) into a
//! concrete syntax tree, plus the course XML dumps of both.
//!
//! # Usage
//!
//! ```no_run
//! use jack_analyzer::{analyze_directory, analyze_file};
//! use std::path::Path;
//!
//! // Analyze a single file
//! let result = analyze_file(Path::new("Main.jack"));
//!
//! // Analyze a directory (parallel processing)
//! let results = analyze_directory(Path::new("Square/"));
//! ```

pub mod error;
pub mod parser;
pub mod token;
pub mod tokenizer;
pub mod tree;
pub mod xml;

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub use crate::error::{JackError, Result};
use crate::parser::Parser;
use crate::token::SpannedToken;
use crate::tokenizer::JackTokenizer;
use crate::tree::NonTerminal;

/// Tokenize Jack source.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>> {
    JackTokenizer::new(source).tokenize()
}

/// Tokenize and parse one class.
pub fn parse(source: &str) -> Result<NonTerminal> {
    let tokens = tokenize(source)?;
    Parser::new(&tokens).parse()
}

/// XML dumps of one analyzed class.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Token XML output (for *T.xml file).
    pub token_xml: String,
    /// Parse tree XML output (for *.xml file).
    pub tree_xml: String,
}

/// Result of analyzing a single Jack file.
#[derive(Debug)]
pub struct AnalysisResult {
    /// The filename that was analyzed.
    pub filename: String,
    pub output: Result<Analysis>,
}

impl AnalysisResult {
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

/// Analyze Jack source code directly.
pub fn analyze_source(source: &str) -> Result<Analysis> {
    let tokens = tokenize(source)?;
    let token_xml = xml::tokens_to_xml(&tokens);
    let class = Parser::new(&tokens).parse()?;
    Ok(Analysis {
        token_xml,
        tree_xml: xml::tree_to_xml(&class),
    })
}

/// Analyze a single Jack file.
pub fn analyze_file(path: &Path) -> AnalysisResult {
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let output = fs::read_to_string(path)
        .map_err(|e| JackError::io(path, e))
        .and_then(|source| analyze_source(&source));

    AnalysisResult { filename, output }
}

/// All `.jack` files directly inside `dir`, sorted by path.
pub fn jack_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| JackError::io(dir, e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "jack"))
        .collect();
    files.sort();
    Ok(files)
}

/// Analyze all Jack files in a directory.
///
/// Files are analyzed in parallel; results come back in file name order.
pub fn analyze_directory(dir: &Path) -> Result<Vec<AnalysisResult>> {
    let files = jack_files(dir)?;
    Ok(files.par_iter().map(|path| analyze_file(path)).collect())
}

/// Write *T.xml (tokens) and *.xml (parse tree) into `output_dir`.
///
/// Returns the written paths.
pub fn write_results(
    stem: &str,
    analysis: &Analysis,
    output_dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    let token_path = output_dir.join(format!("{}T.xml", stem));
    fs::write(&token_path, &analysis.token_xml).map_err(|e| JackError::io(&token_path, e))?;

    let tree_path = output_dir.join(format!("{}.xml", stem));
    fs::write(&tree_path, &analysis.tree_xml).map_err(|e| JackError::io(&tree_path, e))?;

    Ok((token_path, tree_path))
}
