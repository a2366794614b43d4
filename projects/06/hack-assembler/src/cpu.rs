//! Hack CPU model for running assembled programs.
//!
//! Executes `.hack` binary text one instruction per step. The data memory is
//! the 32K word RAM with no screen or keyboard behaviour attached.

use crate::error::{AsmError, Result};

pub const RAM_SIZE: usize = 32768;

/// Instruction bits of a C-instruction.
const A_BIT: u16 = 1 << 12;
const DEST_A: u16 = 1 << 5;
const DEST_D: u16 = 1 << 4;
const DEST_M: u16 = 1 << 3;
const JUMP_LT: u16 = 1 << 2;
const JUMP_EQ: u16 = 1 << 1;
const JUMP_GT: u16 = 1;

/// `0;JMP`
const UNCONDITIONAL_JUMP: u16 = 0b1110_1010_1000_0111;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The program reached a `@N / 0;JMP` loop on itself.
    Loop,
    /// The program counter ran past the end of ROM.
    EndOfRom,
    /// The step budget ran out first.
    StepLimit,
}

pub struct Cpu {
    rom: Vec<u16>,
    ram: Vec<u16>,
    a: u16,
    d: u16,
    pc: u16,
}

/// The Hack ALU over the six control bits `zx nx zy ny f no`.
fn alu(x: u16, y: u16, control: u16) -> u16 {
    let zx = control & 0b100000 != 0;
    let nx = control & 0b010000 != 0;
    let zy = control & 0b001000 != 0;
    let ny = control & 0b000100 != 0;
    let f = control & 0b000010 != 0;
    let no = control & 0b000001 != 0;

    let mut x = if zx { 0 } else { x };
    if nx {
        x = !x;
    }
    let mut y = if zy { 0 } else { y };
    if ny {
        y = !y;
    }
    let out = if f { x.wrapping_add(y) } else { x & y };
    if no { !out } else { out }
}

impl Cpu {
    pub fn new(rom: Vec<u16>) -> Self {
        Self {
            rom,
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    /// Load binary text as produced by [`crate::assemble`].
    pub fn from_hack(binary: &str) -> Result<Self> {
        let mut rom = Vec::new();
        for (idx, line) in binary.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let word = if line.len() == 16 {
                u16::from_str_radix(line, 2).ok()
            } else {
                None
            };
            match word {
                Some(word) => rom.push(word),
                None => {
                    return Err(AsmError::InvalidSyntax {
                        line: idx + 1,
                        text: line.to_string(),
                    });
                }
            }
        }
        Ok(Self::new(rom))
    }

    pub fn peek(&self, addr: u16) -> u16 {
        self.ram[addr as usize % RAM_SIZE]
    }

    pub fn poke(&mut self, addr: u16, value: u16) {
        self.ram[addr as usize % RAM_SIZE] = value;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Execute one instruction. Returns false once the PC is outside ROM.
    pub fn step(&mut self) -> bool {
        let Some(&word) = self.rom.get(self.pc as usize) else {
            return false;
        };

        if word & 0x8000 == 0 {
            self.a = word;
            self.pc += 1;
            return true;
        }

        let addr = self.a;
        let y = if word & A_BIT != 0 { self.peek(addr) } else { addr };
        let out = alu(self.d, y, (word >> 6) & 0b111111);

        // M is written through the address held before this instruction
        if word & DEST_M != 0 {
            self.poke(addr, out);
        }
        if word & DEST_A != 0 {
            self.a = out;
        }
        if word & DEST_D != 0 {
            self.d = out;
        }

        let signed = out as i16;
        let jump = (word & JUMP_LT != 0 && signed < 0)
            || (word & JUMP_EQ != 0 && signed == 0)
            || (word & JUMP_GT != 0 && signed > 0);
        self.pc = if jump { addr } else { self.pc + 1 };
        true
    }

    fn at_halt_loop(&self) -> bool {
        let pc = self.pc as usize;
        pc > 0
            && self.rom.get(pc) == Some(&UNCONDITIONAL_JUMP)
            && self.rom.get(pc - 1) == Some(&((pc - 1) as u16))
            && self.a as usize == pc - 1
    }

    /// Run until the program halts or `max_steps` instructions have executed.
    pub fn run(&mut self, max_steps: usize) -> Halt {
        for _ in 0..max_steps {
            if self.at_halt_loop() {
                return Halt::Loop;
            }
            if !self.step() {
                return Halt::EndOfRom;
            }
        }
        Halt::StepLimit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble;

    fn run(source: &str) -> Cpu {
        let mut cpu = Cpu::from_hack(&assemble(source).unwrap()).unwrap();
        cpu.run(10_000);
        cpu
    }

    #[test]
    fn test_add() {
        let cpu = run("@2\nD=A\n@3\nD=D+A\n@0\nM=D");
        assert_eq!(cpu.peek(0), 5);
    }

    #[test]
    fn test_every_comp_against_reference() {
        use crate::instruction::Comp;
        let (a, d, m) = (12u16, 5u16, 7u16);
        for comp in Comp::ALL {
            let expected: u16 = match comp.mnemonic() {
                "0" => 0,
                "1" => 1,
                "-1" => 0xFFFF,
                "D" => d,
                "A" => a,
                "!D" => !d,
                "!A" => !a,
                "-D" => d.wrapping_neg(),
                "-A" => a.wrapping_neg(),
                "D+1" => d + 1,
                "A+1" => a + 1,
                "D-1" => d - 1,
                "A-1" => a - 1,
                "D+A" => d + a,
                "D-A" => d.wrapping_sub(a),
                "A-D" => a - d,
                "D&A" => d & a,
                "D|A" => d | a,
                "M" => m,
                "!M" => !m,
                "-M" => m.wrapping_neg(),
                "M+1" => m + 1,
                "M-1" => m - 1,
                "D+M" => d + m,
                "D-M" => d.wrapping_sub(m),
                "M-D" => m - d,
                "D&M" => d & m,
                "D|M" => d | m,
                other => panic!("unexpected mnemonic {}", other),
            };
            let source = format!(
                "@{m}\nD=A\n@{a}\nM=D\n@{d}\nD=A\n@{a}\nD={}\n@100\nM=D",
                comp.mnemonic()
            );
            let cpu = run(&source);
            assert_eq!(cpu.peek(100), expected, "comp {}", comp.mnemonic());
        }
    }

    #[test]
    fn test_conditional_jump() {
        // R1 = R0 > 0 ? 1 : 2
        let source = "@3\nD=A\n@R0\nM=D\n@R0\nD=M\n@POS\nD;JGT\n@2\nD=A\n@R1\nM=D\n@END\n0;JMP\n(POS)\n@R1\nM=1\n(END)\n@END\n0;JMP";
        let mut cpu = Cpu::from_hack(&assemble(source).unwrap()).unwrap();
        assert_eq!(cpu.run(1000), Halt::Loop);
        assert_eq!(cpu.peek(1), 1);
    }

    #[test]
    fn test_end_of_rom() {
        let mut cpu = Cpu::from_hack(&assemble("@1\nD=A").unwrap()).unwrap();
        assert_eq!(cpu.run(100), Halt::EndOfRom);
    }

    #[test]
    fn test_step_limit() {
        // A loop that is not a self-jump
        let mut cpu = Cpu::from_hack(&assemble("(L)\n@R0\nM=M+1\n@L\n0;JMP").unwrap()).unwrap();
        assert_eq!(cpu.run(40), Halt::StepLimit);
        assert_eq!(cpu.peek(0), 10);
    }

    #[test]
    fn test_rejects_malformed_binary() {
        assert!(Cpu::from_hack("0101").is_err());
        assert!(Cpu::from_hack("000000000000000x").is_err());
    }
}
