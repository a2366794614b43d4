use phf::phf_map;

/// Computation field of a C-instruction: the `a` bit plus six `c` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comp {
    Zero,
    One,
    NegOne,
    D,
    A,
    NotD,
    NotA,
    NegD,
    NegA,
    DPlusOne,
    APlusOne,
    DMinusOne,
    AMinusOne,
    DPlusA,
    DMinusA,
    AMinusD,
    DAndA,
    DOrA,
    M,
    NotM,
    NegM,
    MPlusOne,
    MMinusOne,
    DPlusM,
    DMinusM,
    MMinusD,
    DAndM,
    DOrM,
}

/// Comp mnemonics, including the commutative spellings accepted as aliases.
static COMP: phf::Map<&'static str, Comp> = phf_map! {
    "0" => Comp::Zero,
    "1" => Comp::One,
    "-1" => Comp::NegOne,
    "D" => Comp::D,
    "A" => Comp::A,
    "!D" => Comp::NotD,
    "!A" => Comp::NotA,
    "-D" => Comp::NegD,
    "-A" => Comp::NegA,
    "D+1" => Comp::DPlusOne, "1+D" => Comp::DPlusOne,
    "A+1" => Comp::APlusOne, "1+A" => Comp::APlusOne,
    "D-1" => Comp::DMinusOne,
    "A-1" => Comp::AMinusOne,
    "D+A" => Comp::DPlusA, "A+D" => Comp::DPlusA,
    "D-A" => Comp::DMinusA,
    "A-D" => Comp::AMinusD,
    "D&A" => Comp::DAndA, "A&D" => Comp::DAndA,
    "D|A" => Comp::DOrA, "A|D" => Comp::DOrA,
    "M" => Comp::M,
    "!M" => Comp::NotM,
    "-M" => Comp::NegM,
    "M+1" => Comp::MPlusOne, "1+M" => Comp::MPlusOne,
    "M-1" => Comp::MMinusOne,
    "D+M" => Comp::DPlusM, "M+D" => Comp::DPlusM,
    "D-M" => Comp::DMinusM,
    "M-D" => Comp::MMinusD,
    "D&M" => Comp::DAndM, "M&D" => Comp::DAndM,
    "D|M" => Comp::DOrM, "M|D" => Comp::DOrM,
};

impl Comp {
    pub const ALL: [Comp; 28] = [
        Comp::Zero,
        Comp::One,
        Comp::NegOne,
        Comp::D,
        Comp::A,
        Comp::NotD,
        Comp::NotA,
        Comp::NegD,
        Comp::NegA,
        Comp::DPlusOne,
        Comp::APlusOne,
        Comp::DMinusOne,
        Comp::AMinusOne,
        Comp::DPlusA,
        Comp::DMinusA,
        Comp::AMinusD,
        Comp::DAndA,
        Comp::DOrA,
        Comp::M,
        Comp::NotM,
        Comp::NegM,
        Comp::MPlusOne,
        Comp::MMinusOne,
        Comp::DPlusM,
        Comp::DMinusM,
        Comp::MMinusD,
        Comp::DAndM,
        Comp::DOrM,
    ];

    pub fn from_mnemonic(s: &str) -> Option<Comp> {
        COMP.get(s).copied()
    }

    /// Canonical spelling.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Comp::Zero => "0",
            Comp::One => "1",
            Comp::NegOne => "-1",
            Comp::D => "D",
            Comp::A => "A",
            Comp::NotD => "!D",
            Comp::NotA => "!A",
            Comp::NegD => "-D",
            Comp::NegA => "-A",
            Comp::DPlusOne => "D+1",
            Comp::APlusOne => "A+1",
            Comp::DMinusOne => "D-1",
            Comp::AMinusOne => "A-1",
            Comp::DPlusA => "D+A",
            Comp::DMinusA => "D-A",
            Comp::AMinusD => "A-D",
            Comp::DAndA => "D&A",
            Comp::DOrA => "D|A",
            Comp::M => "M",
            Comp::NotM => "!M",
            Comp::NegM => "-M",
            Comp::MPlusOne => "M+1",
            Comp::MMinusOne => "M-1",
            Comp::DPlusM => "D+M",
            Comp::DMinusM => "D-M",
            Comp::MMinusD => "M-D",
            Comp::DAndM => "D&M",
            Comp::DOrM => "D|M",
        }
    }

    /// `a cccccc` as the low seven bits.
    pub fn bits(self) -> u8 {
        match self {
            // a=0
            Comp::Zero => 0b0101010,
            Comp::One => 0b0111111,
            Comp::NegOne => 0b0111010,
            Comp::D => 0b0001100,
            Comp::A => 0b0110000,
            Comp::NotD => 0b0001101,
            Comp::NotA => 0b0110001,
            Comp::NegD => 0b0001111,
            Comp::NegA => 0b0110011,
            Comp::DPlusOne => 0b0011111,
            Comp::APlusOne => 0b0110111,
            Comp::DMinusOne => 0b0001110,
            Comp::AMinusOne => 0b0110010,
            Comp::DPlusA => 0b0000010,
            Comp::DMinusA => 0b0010011,
            Comp::AMinusD => 0b0000111,
            Comp::DAndA => 0b0000000,
            Comp::DOrA => 0b0010101,
            // a=1
            Comp::M => 0b1110000,
            Comp::NotM => 0b1110001,
            Comp::NegM => 0b1110011,
            Comp::MPlusOne => 0b1110111,
            Comp::MMinusOne => 0b1110010,
            Comp::DPlusM => 0b1000010,
            Comp::DMinusM => 0b1010011,
            Comp::MMinusD => 0b1000111,
            Comp::DAndM => 0b1000000,
            Comp::DOrM => 0b1010101,
        }
    }
}

/// Destination field: any subset of `{A, D, M}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dest(u8);

impl Dest {
    pub const NULL: Dest = Dest(0);
    pub const M: Dest = Dest(0b001);
    pub const D: Dest = Dest(0b010);
    pub const A: Dest = Dest(0b100);

    /// Parse a non-empty register list such as `AM` or `DM`. Each register
    /// may appear once, in any order.
    pub fn from_mnemonic(s: &str) -> Option<Dest> {
        if s.is_empty() {
            return None;
        }
        let mut bits = 0u8;
        for c in s.chars() {
            let bit = match c {
                'A' => Dest::A.0,
                'D' => Dest::D.0,
                'M' => Dest::M.0,
                _ => return None,
            };
            if bits & bit != 0 {
                return None;
            }
            bits |= bit;
        }
        Some(Dest(bits))
    }

    pub fn from_bits(bits: u8) -> Dest {
        Dest(bits & 0b111)
    }

    /// `d1 d2 d3`, with d1 = A, d2 = D, d3 = M.
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Dest) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Jump {
    #[default]
    Null,
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

static JUMP: phf::Map<&'static str, Jump> = phf_map! {
    "JGT" => Jump::JGT,
    "JEQ" => Jump::JEQ,
    "JGE" => Jump::JGE,
    "JLT" => Jump::JLT,
    "JNE" => Jump::JNE,
    "JLE" => Jump::JLE,
    "JMP" => Jump::JMP,
};

impl Jump {
    pub fn from_mnemonic(s: &str) -> Option<Jump> {
        JUMP.get(s).copied()
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Operand of an A-instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Literal(u16),
    Symbol(String),
}

/// A Hack assembly command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    A(Address),
    C { dest: Dest, comp: Comp, jump: Jump },
}

/// Resolved instruction with all symbols converted to addresses.
/// Unresolved symbols cannot reach the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedInstruction {
    A(u16),
    C { dest: Dest, comp: Comp, jump: Jump },
}

impl Instruction {
    /// Resolve an instruction, looking up symbolic addresses with `lookup`.
    pub fn resolve<E>(
        &self,
        lookup: impl FnOnce(&str) -> Result<u16, E>,
    ) -> Result<ResolvedInstruction, E> {
        Ok(match self {
            Instruction::A(Address::Literal(v)) => ResolvedInstruction::A(*v),
            Instruction::A(Address::Symbol(s)) => ResolvedInstruction::A(lookup(s)?),
            Instruction::C { dest, comp, jump } => ResolvedInstruction::C {
                dest: *dest,
                comp: *comp,
                jump: *jump,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_canonical_mnemonic_round_trips() {
        for comp in Comp::ALL {
            assert_eq!(Comp::from_mnemonic(comp.mnemonic()), Some(comp));
        }
    }

    #[test]
    fn test_comp_bits_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for comp in Comp::ALL {
            assert!(seen.insert(comp.bits()), "duplicate bits for {:?}", comp);
        }
    }

    #[test]
    fn test_comp_aliases() {
        assert_eq!(Comp::from_mnemonic("A+D"), Some(Comp::DPlusA));
        assert_eq!(Comp::from_mnemonic("M|D"), Some(Comp::DOrM));
        assert_eq!(Comp::from_mnemonic("1+M"), Some(Comp::MPlusOne));
        assert_eq!(Comp::from_mnemonic("D*A"), None);
    }

    #[test]
    fn test_dest_parsing() {
        assert_eq!(Dest::from_mnemonic("M"), Some(Dest::M));
        assert_eq!(Dest::from_mnemonic("MD").map(Dest::bits), Some(0b011));
        assert_eq!(Dest::from_mnemonic("DM").map(Dest::bits), Some(0b011));
        assert_eq!(Dest::from_mnemonic("AMD").map(Dest::bits), Some(0b111));
        assert_eq!(Dest::from_mnemonic("DAM").map(Dest::bits), Some(0b111));
        assert_eq!(Dest::from_mnemonic("MM"), None);
        assert_eq!(Dest::from_mnemonic("X"), None);
        assert_eq!(Dest::from_mnemonic(""), None);
    }

    #[test]
    fn test_jump_bits() {
        assert_eq!(Jump::Null.bits(), 0b000);
        assert_eq!(Jump::from_mnemonic("JGT").map(Jump::bits), Some(0b001));
        assert_eq!(Jump::from_mnemonic("JLE").map(Jump::bits), Some(0b110));
        assert_eq!(Jump::from_mnemonic("JMP").map(Jump::bits), Some(0b111));
        assert_eq!(Jump::from_mnemonic("jmp"), None);
    }

    #[test]
    fn test_resolve_symbol() {
        let inst = Instruction::A(Address::Symbol("LOOP".to_string()));
        let resolved = inst.resolve(|_| Ok::<_, ()>(42)).unwrap();
        assert_eq!(resolved, ResolvedInstruction::A(42));
    }
}
