//! Bootstrap code: `SP = 256`, then `call Sys.init 0`.

use std::rc::Rc;

use crate::codegen::{CodeGenerator, write_u16};
use crate::memory::STACK_BASE;
use crate::parser::{SourceCommand, VMCommand};

/// Label scope used by the bootstrap's own call and halt loop.
pub const BOOTSTRAP_SCOPE: &str = "Bootstrap";

/// Write the bootstrap through the shared generator so the synthetic call
/// uses the same frame template and return label counter as the program.
pub fn write_bootstrap(codegen: &mut CodeGenerator, buf: &mut String) {
    buf.push('@');
    write_u16(STACK_BASE, buf);
    buf.push_str("\nD=A\n@SP\nM=D\n");

    codegen.start_unit();
    let call = SourceCommand {
        command: VMCommand::Call {
            name: "Sys.init".to_string(),
            num_args: 0,
        },
        file: Rc::from(BOOTSTRAP_SCOPE),
        line: 0,
    };
    codegen.translate(&call, buf);

    // Sys.init is not expected to return; park the CPU if it does
    buf.push_str("(Bootstrap$$HALT)\n@Bootstrap$$HALT\n0;JMP\n");
}

/// Bootstrap on a fresh generator.
pub fn generate_bootstrap() -> String {
    let mut buf = String::with_capacity(512);
    write_bootstrap(&mut CodeGenerator::new(), &mut buf);
    buf
}
