pub mod codegen;
pub mod cpu;
pub mod error;
pub mod instruction;
pub mod parser;
pub mod symbols;

use std::fs;
use std::path::{Path, PathBuf};

use codegen::HackCodeGen;
use error::{AsmError, Result};
use instruction::Instruction;
use parser::{Line, MAX_ADDRESS, parse_line};
use symbols::{InsertError, SymbolTable};

/// Assemble Hack assembly source to binary text, one 16-character word per
/// line, each line terminated by `\n`.
pub fn assemble(source: &str) -> Result<String> {
    // Pass 1: parse every line and bind labels to ROM addresses
    let mut symbol_table = SymbolTable::new();
    let mut instructions: Vec<(usize, Instruction)> = Vec::new();
    let mut rom_address = 0u32;

    for (idx, line) in source.lines().enumerate() {
        let line_num = idx + 1;
        match parse_line(line, line_num)? {
            Line::Label(label) => {
                if rom_address > MAX_ADDRESS as u32 {
                    return Err(AsmError::AddressOutOfRange {
                        line: line_num,
                        value: rom_address.to_string(),
                    });
                }
                symbol_table
                    .add_label(&label, rom_address as u16)
                    .map_err(|_| AsmError::DuplicateSymbol {
                        line: line_num,
                        symbol: label,
                    })?;
            }
            Line::Instruction(inst) => {
                instructions.push((line_num, inst));
                rom_address += 1;
            }
            Line::Empty => {}
        }
    }

    // Pass 2: resolve variables and encode
    let codegen = HackCodeGen::hack();
    let mut output = String::with_capacity(instructions.len() * 17);

    for (line_num, inst) in &instructions {
        let resolved = inst.resolve(|symbol| {
            symbol_table
                .resolve_or_allocate(symbol)
                .map_err(|err| match err {
                    InsertError::Overflow => AsmError::SymbolOverflow {
                        line: *line_num,
                        symbol: symbol.to_string(),
                    },
                    InsertError::Duplicate => AsmError::DuplicateSymbol {
                        line: *line_num,
                        symbol: symbol.to_string(),
                    },
                })
        })?;

        codegen.encode(&resolved, &mut output);
        output.push('\n');
    }

    Ok(output)
}

/// `Prog.asm` -> `Prog.hack`
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension("hack")
}

/// Assemble a file and write the sibling `.hack` file. Nothing is written
/// when assembly fails.
pub fn assemble_file(input: &Path) -> Result<PathBuf> {
    let source = fs::read_to_string(input).map_err(|source| AsmError::FileRead {
        path: input.to_path_buf(),
        source,
    })?;
    let binary = assemble(&source)?;
    let out = output_path(input);
    fs::write(&out, binary).map_err(|source| AsmError::FileWrite {
        path: out.clone(),
        source,
    })?;
    Ok(out)
}
