//! VM command emitter for the Jack compiler.
//!
//! Commands are collected as typed [`VMCommand`] values and rendered as VM
//! text at the end, one command per line.

use vm_translator::parser::{ArithmeticOp, Segment, VMCommand};

/// Rough bytes per rendered command.
const BYTES_PER_COMMAND: usize = 16;

#[derive(Debug, Default)]
pub struct VMWriter {
    commands: Vec<VMCommand>,
}

impl VMWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn write_push(&mut self, segment: Segment, index: u16) {
        self.commands.push(VMCommand::Push { segment, index });
    }

    #[inline]
    pub fn write_pop(&mut self, segment: Segment, index: u16) {
        self.commands.push(VMCommand::Pop { segment, index });
    }

    #[inline]
    pub fn write_arithmetic(&mut self, op: ArithmeticOp) {
        self.commands.push(VMCommand::Arithmetic(op));
    }

    #[inline]
    pub fn write_label(&mut self, name: String) {
        self.commands.push(VMCommand::Label { name });
    }

    #[inline]
    pub fn write_goto(&mut self, label: String) {
        self.commands.push(VMCommand::Goto { label });
    }

    #[inline]
    pub fn write_if(&mut self, label: String) {
        self.commands.push(VMCommand::IfGoto { label });
    }

    #[inline]
    pub fn write_function(&mut self, name: String, num_locals: u16) {
        self.commands.push(VMCommand::Function { name, num_locals });
    }

    #[inline]
    pub fn write_call(&mut self, name: String, num_args: u16) {
        self.commands.push(VMCommand::Call { name, num_args });
    }

    #[inline]
    pub fn write_return(&mut self) {
        self.commands.push(VMCommand::Return);
    }

    pub fn commands(&self) -> &[VMCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<VMCommand> {
        self.commands
    }

    pub fn into_output(self) -> String {
        render(&self.commands)
    }
}

/// VM text for `commands`, each line newline-terminated.
pub fn render(commands: &[VMCommand]) -> String {
    let mut output = String::with_capacity(commands.len() * BYTES_PER_COMMAND);
    for command in commands {
        output.push_str(&command.to_string());
        output.push('\n');
    }
    output
}
