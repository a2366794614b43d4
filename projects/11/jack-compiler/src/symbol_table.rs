//! Two-level symbol table for the Jack compiler.
//!
//! The symbol table maintains two scopes:
//! - **Class scope**: `static` and `field` variables, persists across subroutines
//! - **Subroutine scope**: `argument` and `var` variables, reset per subroutine
//!
//! Lookup is subroutine-first, allowing local variables to shadow class-level ones.

use crate::error::{CompileError, Result};
use jack_analyzer::token::{MAX_INT, Span};
use jack_analyzer::tree::{ResolvedVar, VarKind};
use std::collections::HashMap;
use vm_translator::parser::Segment;

/// VM segment holding variables of `kind`.
#[inline]
pub fn segment_of(kind: VarKind) -> Segment {
    match kind {
        VarKind::Static => Segment::Static,
        VarKind::Field => Segment::This,
        VarKind::Argument => Segment::Argument,
        VarKind::Var => Segment::Local,
    }
}

#[inline]
fn is_class_level(kind: VarKind) -> bool {
    matches!(kind, VarKind::Static | VarKind::Field)
}

fn plural(kind: VarKind) -> &'static str {
    match kind {
        VarKind::Static => "static variables",
        VarKind::Field => "fields",
        VarKind::Argument => "arguments",
        VarKind::Var => "local variables",
    }
}

/// A symbol entry in the symbol table.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// `int`, `char`, `boolean` or a class name.
    pub ty: String,
    pub kind: VarKind,
    /// Index within its segment.
    pub index: u16,
}

impl Symbol {
    #[inline]
    pub fn segment(&self) -> Segment {
        segment_of(self.kind)
    }

    /// The `(kind, type, index)` triple copied into identifier metadata.
    pub fn resolved(&self) -> ResolvedVar {
        ResolvedVar {
            kind: self.kind,
            ty: self.ty.clone(),
            index: self.index,
        }
    }
}

/// Two-level symbol table for Jack compilation.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Symbol>,
    subroutine_scope: HashMap<String, Symbol>,
    static_count: u16,
    field_count: u16,
    argument_count: u16,
    var_count: u16,
    class_name: String,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new class.
    ///
    /// Clears both scopes and resets every counter.
    pub fn start_class(&mut self, name: &str) {
        self.class_scope.clear();
        self.subroutine_scope.clear();
        self.static_count = 0;
        self.field_count = 0;
        self.argument_count = 0;
        self.var_count = 0;
        self.class_name = name.to_string();
    }

    /// Start a new subroutine.
    ///
    /// Clears subroutine-level symbols and resets argument/var counters.
    /// Class-level symbols remain accessible.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.argument_count = 0;
        self.var_count = 0;
    }

    /// Define a new symbol in the scope its kind belongs to.
    ///
    /// Fails if the name is already defined in that scope.
    pub fn define(&mut self, name: &str, ty: &str, kind: VarKind, span: Span) -> Result<ResolvedVar> {
        let scope = if is_class_level(kind) {
            &self.class_scope
        } else {
            &self.subroutine_scope
        };
        if scope.contains_key(name) {
            return Err(CompileError::duplicate_definition(name, span));
        }

        let counter = match kind {
            VarKind::Static => &mut self.static_count,
            VarKind::Field => &mut self.field_count,
            VarKind::Argument => &mut self.argument_count,
            VarKind::Var => &mut self.var_count,
        };
        let index = *counter;
        if index >= MAX_INT {
            return Err(CompileError::TooMany {
                what: plural(kind),
                limit: MAX_INT,
                span,
            });
        }
        *counter += 1;

        let symbol = Symbol {
            name: name.to_string(),
            ty: ty.to_string(),
            kind,
            index,
        };
        let resolved = symbol.resolved();

        if is_class_level(kind) {
            self.class_scope.insert(name.to_string(), symbol);
        } else {
            self.subroutine_scope.insert(name.to_string(), symbol);
        }

        Ok(resolved)
    }

    /// Look up a symbol, subroutine scope first.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    /// Number of symbols defined so far of the given kind.
    pub fn var_count(&self, kind: VarKind) -> u16 {
        match kind {
            VarKind::Static => self.static_count,
            VarKind::Field => self.field_count,
            VarKind::Argument => self.argument_count,
            VarKind::Var => self.var_count,
        }
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}
