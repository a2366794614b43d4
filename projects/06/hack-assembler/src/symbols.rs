use phf::phf_map;
use std::collections::HashMap;

/// Predefined symbols (compile-time perfect hash map)
pub static PREDEFINED: phf::Map<&'static str, u16> = phf_map! {
    "R0" => 0, "R1" => 1, "R2" => 2, "R3" => 3,
    "R4" => 4, "R5" => 5, "R6" => 6, "R7" => 7,
    "R8" => 8, "R9" => 9, "R10" => 10, "R11" => 11,
    "R12" => 12, "R13" => 13, "R14" => 14, "R15" => 15,
    "SP" => 0, "LCL" => 1, "ARG" => 2, "THIS" => 3, "THAT" => 4,
    "SCREEN" => 16384, "KBD" => 24576,
};

/// First RAM address handed out to variables.
pub const VARIABLE_BASE: u16 = 16;

/// Variables must stay below the memory-mapped screen.
pub const VARIABLE_LIMIT: u16 = 16384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// The name is already predefined, a label, or a variable.
    Duplicate,
    /// No RAM left for another variable.
    Overflow,
}

pub struct SymbolTable {
    symbols: HashMap<String, u16>,
    next_var_address: u16,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: HashMap::with_capacity(64),
            next_var_address: VARIABLE_BASE,
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        PREDEFINED.contains_key(symbol) || self.symbols.contains_key(symbol)
    }

    pub fn add_label(&mut self, label: &str, address: u16) -> Result<(), InsertError> {
        if self.contains(label) {
            return Err(InsertError::Duplicate);
        }
        self.symbols.insert(label.to_string(), address);
        Ok(())
    }

    /// Allocate the next free RAM word for a new variable.
    pub fn add_variable(&mut self, symbol: &str) -> Result<u16, InsertError> {
        if self.contains(symbol) {
            return Err(InsertError::Duplicate);
        }
        if self.next_var_address >= VARIABLE_LIMIT {
            return Err(InsertError::Overflow);
        }
        let addr = self.next_var_address;
        self.symbols.insert(symbol.to_string(), addr);
        self.next_var_address += 1;
        Ok(addr)
    }

    pub fn resolve(&self, symbol: &str) -> Option<u16> {
        PREDEFINED
            .get(symbol)
            .copied()
            .or_else(|| self.symbols.get(symbol).copied())
    }

    pub fn resolve_or_allocate(&mut self, symbol: &str) -> Result<u16, InsertError> {
        match self.resolve(symbol) {
            Some(addr) => Ok(addr),
            None => self.add_variable(symbol),
        }
    }

    /// Number of variables allocated so far.
    pub fn variable_count(&self) -> u16 {
        self.next_var_address - VARIABLE_BASE
    }
}
