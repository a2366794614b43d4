use crate::instruction::{Comp, Dest, Jump, ResolvedInstruction};

/// Output format for resolved instructions. Encoders append to a caller
/// supplied buffer.
pub trait Backend {
    fn encode_a(&self, value: u16, buf: &mut String);
    fn encode_c(&self, dest: Dest, comp: Comp, jump: Jump, buf: &mut String);
}

/// Hack binary text: sixteen `0`/`1` characters per word.
pub struct HackBinary;

impl HackBinary {
    pub fn c_word(dest: Dest, comp: Comp, jump: Jump) -> u16 {
        0b1110_0000_0000_0000
            | ((comp.bits() as u16) << 6)
            | ((dest.bits() as u16) << 3)
            | (jump.bits() as u16)
    }
}

fn push_word(word: u16, buf: &mut String) {
    for i in (0..16).rev() {
        buf.push(if word & (1 << i) != 0 { '1' } else { '0' });
    }
}

impl Backend for HackBinary {
    fn encode_a(&self, value: u16, buf: &mut String) {
        push_word(value & 0x7FFF, buf);
    }

    fn encode_c(&self, dest: Dest, comp: Comp, jump: Jump, buf: &mut String) {
        push_word(Self::c_word(dest, comp, jump), buf);
    }
}

/// Code generator (generic over backend)
pub struct CodeGen<B: Backend> {
    backend: B,
}

impl<B: Backend> CodeGen<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn encode(&self, inst: &ResolvedInstruction, buf: &mut String) {
        match *inst {
            ResolvedInstruction::A(value) => self.backend.encode_a(value, buf),
            ResolvedInstruction::C { dest, comp, jump } => {
                self.backend.encode_c(dest, comp, jump, buf)
            }
        }
    }
}

pub type HackCodeGen = CodeGen<HackBinary>;

impl HackCodeGen {
    pub fn hack() -> Self {
        Self::new(HackBinary)
    }
}
