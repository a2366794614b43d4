use crate::error::{AsmError, Result};
use crate::instruction::{Address, Comp, Dest, Instruction, Jump};

/// Largest value an A-instruction can carry (15 bits).
pub const MAX_ADDRESS: u16 = 0x7FFF;

#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Instruction(Instruction),
    Label(String),
    Empty,
}

/// Strip comments and whitespace
fn clean_line(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

/// `[A-Za-z_.$:][A-Za-z0-9_.$:]*`
pub fn is_valid_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '_' | '.' | '$' | ':') => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':'))
}

/// Parse A-instruction (@value or @symbol)
fn parse_a_instruction(line: &str, line_num: usize) -> Result<Instruction> {
    let operand = &line[1..];

    if operand.is_empty() {
        return Err(AsmError::InvalidSyntax {
            line: line_num,
            text: line.to_string(),
        });
    }

    if operand.bytes().all(|b| b.is_ascii_digit()) {
        // Digit strings too long for u32 are out of range as well
        return match operand.parse::<u32>() {
            Ok(value) if value <= MAX_ADDRESS as u32 => {
                Ok(Instruction::A(Address::Literal(value as u16)))
            }
            _ => Err(AsmError::AddressOutOfRange {
                line: line_num,
                value: operand.to_string(),
            }),
        };
    }

    if !is_valid_symbol(operand) {
        return Err(AsmError::InvalidSymbol {
            line: line_num,
            symbol: operand.to_string(),
        });
    }

    Ok(Instruction::A(Address::Symbol(operand.to_string())))
}

/// Parse C-instruction (dest=comp;jump)
fn parse_c_instruction(line: &str, line_num: usize) -> Result<Instruction> {
    let (dest_str, rest) = match line.split_once('=') {
        Some((dest, rest)) => (Some(dest.trim()), rest),
        None => (None, line),
    };

    let (comp_str, jump_str) = match rest.split_once(';') {
        Some((comp, jump)) => (comp.trim(), Some(jump.trim())),
        None => (rest.trim(), None),
    };

    if dest_str.is_none() && jump_str.is_none() {
        return Err(AsmError::InvalidSyntax {
            line: line_num,
            text: line.to_string(),
        });
    }

    let dest = match dest_str {
        Some(s) => Dest::from_mnemonic(s).ok_or_else(|| AsmError::InvalidMnemonic {
            line: line_num,
            field: "dest",
            mnemonic: s.to_string(),
        })?,
        None => Dest::NULL,
    };

    let comp = Comp::from_mnemonic(comp_str).ok_or_else(|| AsmError::InvalidMnemonic {
        line: line_num,
        field: "comp",
        mnemonic: comp_str.to_string(),
    })?;

    let jump = match jump_str {
        Some(s) => Jump::from_mnemonic(s).ok_or_else(|| AsmError::InvalidMnemonic {
            line: line_num,
            field: "jump",
            mnemonic: s.to_string(),
        })?,
        None => Jump::Null,
    };

    Ok(Instruction::C { dest, comp, jump })
}

/// Parse single line
pub fn parse_line(line: &str, line_num: usize) -> Result<Line> {
    let clean = clean_line(line);

    if clean.is_empty() {
        return Ok(Line::Empty);
    }

    if let Some(inner) = clean.strip_prefix('(') {
        let Some(label) = inner.strip_suffix(')') else {
            return Err(AsmError::InvalidSyntax {
                line: line_num,
                text: clean.to_string(),
            });
        };
        if !is_valid_symbol(label) {
            return Err(AsmError::InvalidSymbol {
                line: line_num,
                symbol: label.to_string(),
            });
        }
        return Ok(Line::Label(label.to_string()));
    }

    if clean.starts_with('@') {
        return Ok(Line::Instruction(parse_a_instruction(clean, line_num)?));
    }

    Ok(Line::Instruction(parse_c_instruction(clean, line_num)?))
}
