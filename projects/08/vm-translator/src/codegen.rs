//! Hack assembly code generation for the VM commands.
//!
//! Every command lowers to a fixed template appended to a caller supplied
//! buffer.

use crate::memory::{POP_DEST, SegmentAccess, segment_access};
use crate::parser::{ArithmeticOp, Segment, SourceCommand, VMCommand};

/// Push D onto the stack.
const PUSH_D: &str = "@SP\nA=M\nM=D\n@SP\nM=M+1\n";

/// Pop the stack into D.
const POP_D: &str = "@SP\nAM=M-1\nD=M\n";

/// Code generator for Hack assembly.
///
/// One generator is shared by every unit of a link unit so that return
/// address labels stay unique.
pub struct CodeGenerator {
    /// Counter for unique return address labels
    call_counter: usize,
    /// Current function name for label scoping
    current_function: String,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            call_counter: 0,
            current_function: String::new(),
        }
    }

    /// Forget the enclosing function before translating a new unit.
    pub fn start_unit(&mut self) {
        self.current_function.clear();
    }

    pub fn set_function(&mut self, name: &str) {
        self.current_function.clear();
        self.current_function.push_str(name);
    }

    pub fn current_function(&self) -> &str {
        &self.current_function
    }

    /// Translate a VM command to Hack assembly.
    pub fn translate(&mut self, cmd: &SourceCommand, buf: &mut String) {
        let file = &*cmd.file;
        match &cmd.command {
            VMCommand::Arithmetic(op) => self.translate_arithmetic(*op, file, cmd.line, buf),
            VMCommand::Push { segment, index } => {
                self.translate_push(*segment, *index, file, buf)
            }
            VMCommand::Pop { segment, index } => self.translate_pop(*segment, *index, file, buf),
            VMCommand::Label { name } => self.translate_label(name, file, buf),
            VMCommand::Goto { label } => self.translate_goto(label, file, buf),
            VMCommand::IfGoto { label } => self.translate_if_goto(label, file, buf),
            VMCommand::Function { name, num_locals } => {
                self.translate_function(name, *num_locals, buf)
            }
            VMCommand::Call { name, num_args } => self.translate_call(name, *num_args, file, buf),
            VMCommand::Return => self.translate_return(buf),
        }
    }

    // =========================================================================
    // Arithmetic/Logical Commands
    // =========================================================================

    fn translate_arithmetic(&self, op: ArithmeticOp, file: &str, line: usize, buf: &mut String) {
        match op {
            ArithmeticOp::Add => translate_binary_op("D+M", buf),
            ArithmeticOp::Sub => translate_binary_op("M-D", buf),
            ArithmeticOp::And => translate_binary_op("D&M", buf),
            ArithmeticOp::Or => translate_binary_op("D|M", buf),
            ArithmeticOp::Neg => translate_unary_op("-M", buf),
            ArithmeticOp::Not => translate_unary_op("!M", buf),
            ArithmeticOp::Eq => translate_comparison("EQ", "JEQ", file, line, buf),
            ArithmeticOp::Lt => translate_comparison("LT", "JLT", file, line, buf),
            ArithmeticOp::Gt => translate_comparison("GT", "JGT", file, line, buf),
        }
    }

    // =========================================================================
    // Memory Access Commands
    // =========================================================================

    fn translate_push(&self, segment: Segment, index: u16, file: &str, buf: &mut String) {
        match segment_access(segment) {
            SegmentAccess::Constant => {
                buf.push('@');
                write_u16(index, buf);
                buf.push_str("\nD=A\n");
            }
            SegmentAccess::Indirect(base) => {
                buf.push('@');
                write_u16(index, buf);
                buf.push_str("\nD=A\n@");
                buf.push_str(base);
                buf.push_str("\nA=D+M\nD=M\n");
            }
            SegmentAccess::Direct(base) => {
                buf.push_str("@R");
                write_u16(base + index, buf);
                buf.push_str("\nD=M\n");
            }
            SegmentAccess::Static => {
                buf.push('@');
                write_static(file, index, buf);
                buf.push_str("\nD=M\n");
            }
        }
        buf.push_str(PUSH_D);
    }

    fn translate_pop(&self, segment: Segment, index: u16, file: &str, buf: &mut String) {
        match segment_access(segment) {
            SegmentAccess::Constant => {
                debug_assert!(false, "pop to constant is rejected by the parser");
            }
            SegmentAccess::Indirect(base) => {
                // POP_DEST = base + index, then *POP_DEST = pop()
                buf.push('@');
                write_u16(index, buf);
                buf.push_str("\nD=A\n@");
                buf.push_str(base);
                buf.push_str("\nD=D+M\n@");
                buf.push_str(POP_DEST);
                buf.push_str("\nM=D\n");
                buf.push_str(POP_D);
                buf.push('@');
                buf.push_str(POP_DEST);
                buf.push_str("\nA=M\nM=D\n");
            }
            SegmentAccess::Direct(base) => {
                buf.push_str(POP_D);
                buf.push_str("@R");
                write_u16(base + index, buf);
                buf.push_str("\nM=D\n");
            }
            SegmentAccess::Static => {
                buf.push_str(POP_D);
                buf.push('@');
                write_static(file, index, buf);
                buf.push_str("\nM=D\n");
            }
        }
    }

    // =========================================================================
    // Program Flow Commands
    // =========================================================================

    fn translate_label(&self, name: &str, file: &str, buf: &mut String) {
        buf.push('(');
        self.write_scoped_label(name, file, buf);
        buf.push_str(")\n");
    }

    fn translate_goto(&self, label: &str, file: &str, buf: &mut String) {
        buf.push('@');
        self.write_scoped_label(label, file, buf);
        buf.push_str("\n0;JMP\n");
    }

    fn translate_if_goto(&self, label: &str, file: &str, buf: &mut String) {
        buf.push_str(POP_D);
        buf.push('@');
        self.write_scoped_label(label, file, buf);
        buf.push_str("\nD;JNE\n");
    }

    /// `Function$label`, or `File$label` outside any function.
    fn write_scoped_label(&self, label: &str, file: &str, buf: &mut String) {
        buf.push_str(self.scope(file));
        buf.push('$');
        buf.push_str(label);
    }

    fn scope<'a>(&'a self, file: &'a str) -> &'a str {
        if self.current_function.is_empty() {
            file
        } else {
            &self.current_function
        }
    }

    // =========================================================================
    // Function Commands
    // =========================================================================

    fn translate_function(&mut self, name: &str, num_locals: u16, buf: &mut String) {
        self.set_function(name);

        buf.push('(');
        buf.push_str(name);
        buf.push_str(")\n");

        for _ in 0..num_locals {
            buf.push_str("@SP\nA=M\nM=0\n@SP\nM=M+1\n");
        }
    }

    fn translate_call(&mut self, name: &str, num_args: u16, file: &str, buf: &mut String) {
        let counter = self.call_counter;
        self.call_counter += 1;

        // Push return address
        buf.push('@');
        self.write_return_label(counter, file, buf);
        buf.push_str("\nD=A\n");
        buf.push_str(PUSH_D);

        // Push LCL, ARG, THIS, THAT
        for register in ["LCL", "ARG", "THIS", "THAT"] {
            buf.push('@');
            buf.push_str(register);
            buf.push_str("\nD=M\n");
            buf.push_str(PUSH_D);
        }

        // ARG = SP - num_args - 5
        buf.push_str("@SP\nD=M\n@");
        write_u16(num_args.saturating_add(5), buf);
        buf.push_str("\nD=D-A\n@ARG\nM=D\n");

        // LCL = SP
        buf.push_str("@SP\nD=M\n@LCL\nM=D\n");

        buf.push('@');
        buf.push_str(name);
        buf.push_str("\n0;JMP\n");

        buf.push('(');
        self.write_return_label(counter, file, buf);
        buf.push_str(")\n");
    }

    /// `Function$$ret.N`. VM names cannot contain `$`, so a doubled `$`
    /// never matches a user label.
    fn write_return_label(&self, counter: usize, file: &str, buf: &mut String) {
        buf.push_str(self.scope(file));
        buf.push_str("$$ret.");
        buf.push_str(&counter.to_string());
    }

    fn translate_return(&self, buf: &mut String) {
        // endFrame = LCL (R13)
        buf.push_str("@LCL\nD=M\n@R13\nM=D\n");

        // retAddr = *(endFrame - 5) (R14)
        buf.push_str("@5\nA=D-A\nD=M\n@R14\nM=D\n");

        // *ARG = pop()
        buf.push_str(POP_D);
        buf.push_str("@ARG\nA=M\nM=D\n");

        // SP = ARG + 1
        buf.push_str("@ARG\nD=M+1\n@SP\nM=D\n");

        // THAT, THIS, ARG, LCL = *(endFrame - 1..4)
        for register in ["THAT", "THIS", "ARG", "LCL"] {
            buf.push_str("@R13\nAM=M-1\nD=M\n@");
            buf.push_str(register);
            buf.push_str("\nM=D\n");
        }

        buf.push_str("@R14\nA=M\n0;JMP\n");
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn translate_binary_op(operation: &str, buf: &mut String) {
    // Pop y into D, then compute x op y in place
    buf.push_str("@SP\nAM=M-1\nD=M\nA=A-1\nM=");
    buf.push_str(operation);
    buf.push('\n');
}

fn translate_unary_op(operation: &str, buf: &mut String) {
    buf.push_str("@SP\nA=M-1\nM=");
    buf.push_str(operation);
    buf.push('\n');
}

/// x - y, then overwrite x with -1 (true) or 0 (false).
fn translate_comparison(name: &str, jump: &str, file: &str, line: usize, buf: &mut String) {
    buf.push_str("@SP\nAM=M-1\nD=M\nA=A-1\nD=M-D\n@");
    write_comparison_label(name, "TRUE", file, line, buf);
    buf.push_str("\nD;");
    buf.push_str(jump);
    buf.push_str("\n@SP\nA=M-1\nM=0\n@");
    write_comparison_label(name, "END", file, line, buf);
    buf.push_str("\n0;JMP\n(");
    write_comparison_label(name, "TRUE", file, line, buf);
    // 0xFFFF through !A on zero
    buf.push_str(")\n@0\nD=!A\n@SP\nA=M-1\nM=D\n(");
    write_comparison_label(name, "END", file, line, buf);
    buf.push_str(")\n");
}

/// `File$$EQ_TRUE.12`
fn write_comparison_label(name: &str, suffix: &str, file: &str, line: usize, buf: &mut String) {
    buf.push_str(file);
    buf.push_str("$$");
    buf.push_str(name);
    buf.push('_');
    buf.push_str(suffix);
    buf.push('.');
    buf.push_str(&line.to_string());
}

fn write_static(file: &str, index: u16, buf: &mut String) {
    buf.push_str(file);
    buf.push('.');
    write_u16(index, buf);
}

/// Write a u16 to the buffer without allocation.
#[inline]
pub(crate) fn write_u16(n: u16, buf: &mut String) {
    if n == 0 {
        buf.push('0');
        return;
    }

    let mut digits = [0u8; 5];
    let mut i = 0;
    let mut num = n;

    while num > 0 {
        digits[i] = (num % 10) as u8;
        num /= 10;
        i += 1;
    }

    while i > 0 {
        i -= 1;
        buf.push((b'0' + digits[i]) as char);
    }
}
