//! VM command parser.
//!
//! Parses VM text into typed commands with full validation. Every command
//! keeps the translation unit name and source line it came from.

use std::fmt;
use std::rc::Rc;

use crate::error::{Result, VMError};

/// Largest value `push constant` accepts (15 bits).
pub const MAX_CONSTANT: u16 = 32767;

/// Arithmetic and logical operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Lt,
    Gt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 9] = [
        ArithmeticOp::Add,
        ArithmeticOp::Sub,
        ArithmeticOp::Neg,
        ArithmeticOp::Eq,
        ArithmeticOp::Lt,
        ArithmeticOp::Gt,
        ArithmeticOp::And,
        ArithmeticOp::Or,
        ArithmeticOp::Not,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }

    pub fn from_name(s: &str) -> Option<ArithmeticOp> {
        ArithmeticOp::ALL.into_iter().find(|op| op.as_str() == s)
    }

    /// Unary ops rewrite the top of the stack in place.
    pub fn is_unary(self) -> bool {
        matches!(self, ArithmeticOp::Neg | ArithmeticOp::Not)
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memory segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Pointer,
    Temp,
    Static,
}

impl Segment {
    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
            Segment::Static => "static",
        }
    }

    pub fn from_name(s: &str) -> Option<Segment> {
        match s {
            "constant" => Some(Segment::Constant),
            "local" => Some(Segment::Local),
            "argument" => Some(Segment::Argument),
            "this" => Some(Segment::This),
            "that" => Some(Segment::That),
            "pointer" => Some(Segment::Pointer),
            "temp" => Some(Segment::Temp),
            "static" => Some(Segment::Static),
            _ => None,
        }
    }

    /// Largest valid index, for segments with a fixed size.
    pub fn max_index(self) -> Option<u16> {
        match self {
            Segment::Constant => Some(MAX_CONSTANT),
            Segment::Pointer => Some(1),
            Segment::Temp => Some(7),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// VM command variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VMCommand {
    Arithmetic(ArithmeticOp),

    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },

    Label { name: String },
    Goto { label: String },
    IfGoto { label: String },

    Function { name: String, num_locals: u16 },
    Call { name: String, num_args: u16 },
    Return,
}

/// Renders the command in VM text syntax.
impl fmt::Display for VMCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VMCommand::Arithmetic(op) => write!(f, "{}", op),
            VMCommand::Push { segment, index } => write!(f, "push {} {}", segment, index),
            VMCommand::Pop { segment, index } => write!(f, "pop {} {}", segment, index),
            VMCommand::Label { name } => write!(f, "label {}", name),
            VMCommand::Goto { label } => write!(f, "goto {}", label),
            VMCommand::IfGoto { label } => write!(f, "if-goto {}", label),
            VMCommand::Function { name, num_locals } => {
                write!(f, "function {} {}", name, num_locals)
            }
            VMCommand::Call { name, num_args } => write!(f, "call {} {}", name, num_args),
            VMCommand::Return => f.write_str("return"),
        }
    }
}

/// A command together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCommand {
    pub command: VMCommand,
    /// Translation unit name (file stem).
    pub file: Rc<str>,
    pub line: usize,
}

/// `[A-Za-z_.:][A-Za-z0-9_.:]*`
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '_' | '.' | ':') => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':'))
}

/// Parse every line of a translation unit.
pub fn parse_source(source: &str, filename: &str) -> Result<Vec<SourceCommand>> {
    let file: Rc<str> = Rc::from(filename);
    let mut commands = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        if let Some(command) = parse_line(line, idx + 1, filename)? {
            commands.push(SourceCommand {
                command,
                file: Rc::clone(&file),
                line: idx + 1,
            });
        }
    }
    Ok(commands)
}

/// Parse a single VM line into a command.
///
/// Returns `Ok(None)` for empty lines and comments.
pub fn parse_line(line: &str, line_num: usize, filename: &str) -> Result<Option<VMCommand>> {
    let line = match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    };
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&cmd) = parts.first() else {
        return Ok(None);
    };

    let ctx = LineContext {
        parts: &parts,
        line: line_num,
        file: filename,
    };

    if let Some(op) = ArithmeticOp::from_name(cmd) {
        ctx.arity(1)?;
        return Ok(Some(VMCommand::Arithmetic(op)));
    }

    let command = match cmd {
        "push" => {
            ctx.arity(3)?;
            let (segment, index) = ctx.segment_index()?;
            VMCommand::Push { segment, index }
        }
        "pop" => {
            ctx.arity(3)?;
            let (segment, index) = ctx.segment_index()?;
            if segment == Segment::Constant {
                return Err(VMError::PopToConstant {
                    line: line_num,
                    file: filename.to_string(),
                });
            }
            VMCommand::Pop { segment, index }
        }
        "label" => {
            ctx.arity(2)?;
            VMCommand::Label {
                name: ctx.label()?,
            }
        }
        "goto" => {
            ctx.arity(2)?;
            VMCommand::Goto {
                label: ctx.label()?,
            }
        }
        "if-goto" => {
            ctx.arity(2)?;
            VMCommand::IfGoto {
                label: ctx.label()?,
            }
        }
        "function" => {
            ctx.arity(3)?;
            VMCommand::Function {
                name: ctx.function_name()?,
                num_locals: ctx.number(parts[2])?,
            }
        }
        "call" => {
            ctx.arity(3)?;
            VMCommand::Call {
                name: ctx.function_name()?,
                num_args: ctx.number(parts[2])?,
            }
        }
        "return" => {
            ctx.arity(1)?;
            VMCommand::Return
        }
        _ => {
            return Err(VMError::InvalidCommand {
                line: line_num,
                file: filename.to_string(),
                command: cmd.to_string(),
            });
        }
    };

    Ok(Some(command))
}

struct LineContext<'a> {
    parts: &'a [&'a str],
    line: usize,
    file: &'a str,
}

impl LineContext<'_> {
    fn arity(&self, expected: usize) -> Result<()> {
        if self.parts.len() < expected {
            return Err(VMError::MissingArgument {
                line: self.line,
                file: self.file.to_string(),
                command: self.parts[0].to_string(),
            });
        }
        if self.parts.len() > expected {
            return Err(VMError::UnexpectedArgument {
                line: self.line,
                file: self.file.to_string(),
                command: self.parts[0].to_string(),
                argument: self.parts[expected].to_string(),
            });
        }
        Ok(())
    }

    fn segment_index(&self) -> Result<(Segment, u16)> {
        let segment = Segment::from_name(self.parts[1]).ok_or_else(|| VMError::InvalidSegment {
            line: self.line,
            file: self.file.to_string(),
            segment: self.parts[1].to_string(),
        })?;
        let index = self.number(self.parts[2])?;
        if let Some(max) = segment.max_index()
            && index > max
        {
            return Err(VMError::IndexOutOfRange {
                line: self.line,
                file: self.file.to_string(),
                index,
                segment: segment.as_str(),
            });
        }
        Ok((segment, index))
    }

    fn number(&self, s: &str) -> Result<u16> {
        if let Some(digits) = s.strip_prefix('-')
            && !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(VMError::NegativeIndex {
                line: self.line,
                file: self.file.to_string(),
                value: s.to_string(),
            });
        }
        s.parse::<u16>().map_err(|_| VMError::InvalidNumber {
            line: self.line,
            file: self.file.to_string(),
            value: s.to_string(),
        })
    }

    fn label(&self) -> Result<String> {
        let name = self.parts[1];
        if !is_valid_identifier(name) {
            return Err(VMError::InvalidLabelName {
                line: self.line,
                file: self.file.to_string(),
                name: name.to_string(),
            });
        }
        Ok(name.to_string())
    }

    fn function_name(&self) -> Result<String> {
        let name = self.parts[1];
        if !is_valid_identifier(name) {
            return Err(VMError::InvalidFunctionName {
                line: self.line,
                file: self.file.to_string(),
                name: name.to_string(),
            });
        }
        Ok(name.to_string())
    }
}
