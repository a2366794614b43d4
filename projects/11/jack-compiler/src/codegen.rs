//! VM code generator for the Jack compiler.
//!
//! Walks a resolved class tree (see [`crate::resolver`]) and emits VM
//! commands through the [`VMWriter`]. Variables are read from the metadata
//! the resolver left on identifier leaves.

use crate::error::{CompileError, Result};
use crate::symbol_table::segment_of;
use crate::vm_writer::{VMWriter, render};
use jack_analyzer::token::{Keyword, MAX_INT, Span, Token};
use jack_analyzer::tree::{Node, NodeKind, NonTerminal, ResolvedVar};
use std::collections::HashMap;
use vm_translator::parser::{ArithmeticOp, Segment, VMCommand};

/// Write a u32 value to a string buffer without allocation.
#[inline]
fn write_u32(n: u32, buf: &mut String) {
    if n == 0 {
        buf.push('0');
        return;
    }
    let mut digits = [0u8; 10]; // Max 10 digits for u32
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

/// Shape of a subroutine declared in the class being compiled.
#[derive(Debug, Clone, Copy)]
struct SubroutineInfo {
    kind: Keyword,
    params: usize,
}

/// Code generator that compiles a resolved Jack class to VM code.
pub struct CodeGenerator {
    vm: VMWriter,
    class_name: String,
    subroutine_name: String,
    field_count: u16,
    /// Subroutines of the current class, by name.
    subroutines: HashMap<String, SubroutineInfo>,
    /// Per-subroutine label counters.
    if_counter: u32,
    while_counter: u32,
}

#[inline]
fn is_primitive(ty: &str) -> bool {
    matches!(ty, "int" | "char" | "boolean")
}

/// The symbol of a single-symbol wrapper such as `op`.
#[inline]
fn symbol_of(node: &NonTerminal) -> Option<char> {
    match node.first_terminal().map(|t| &t.token) {
        Some(Token::Symbol(c)) => Some(*c),
        _ => None,
    }
}

/// Number of names declared by `varDec`/`classVarDec` nodes.
fn count_names<'a>(decs: impl Iterator<Item = &'a NonTerminal>) -> usize {
    decs.map(|d| d.children_of(NodeKind::VarName).count()).sum()
}

/// A count that ends up as a VM operand, at most `MAX_INT`.
fn vm_count(count: usize, what: &'static str, span: Span) -> Result<u16> {
    u16::try_from(count)
        .ok()
        .filter(|&n| n <= MAX_INT)
        .ok_or(CompileError::TooMany {
            what,
            limit: MAX_INT,
            span,
        })
}

impl CodeGenerator {
    fn new() -> Self {
        Self {
            vm: VMWriter::new(),
            class_name: String::new(),
            subroutine_name: String::new(),
            field_count: 0,
            subroutines: HashMap::new(),
            if_counter: 0,
            while_counter: 0,
        }
    }

    /// Compile a resolved class to VM commands.
    pub fn compile_commands(class: &NonTerminal) -> Result<Vec<VMCommand>> {
        let mut compiler = CodeGenerator::new();
        compiler.compile_class(class)?;
        Ok(compiler.vm.into_commands())
    }

    /// Compile a resolved class to VM text.
    pub fn compile(class: &NonTerminal) -> Result<String> {
        Self::compile_commands(class).map(|commands| render(&commands))
    }

    /// `{Class}.{subroutine}.{n}.{suffix}`
    fn label(&self, n: u32, suffix: &str) -> String {
        let mut label = String::with_capacity(
            self.class_name.len() + self.subroutine_name.len() + suffix.len() + 13,
        );
        label.push_str(&self.class_name);
        label.push('.');
        label.push_str(&self.subroutine_name);
        label.push('.');
        write_u32(n, &mut label);
        label.push('.');
        label.push_str(suffix);
        label
    }

    #[inline]
    fn push_var(&mut self, var: &ResolvedVar) {
        self.vm.write_push(segment_of(var.kind), var.index);
    }

    #[inline]
    fn pop_var(&mut self, var: &ResolvedVar) {
        self.vm.write_pop(segment_of(var.kind), var.index);
    }

    /// The resolved variable behind a `varName` use.
    fn variable(name: &NonTerminal) -> Result<&ResolvedVar> {
        name.first_terminal()
            .and_then(|t| t.ident.as_ref())
            .and_then(|info| info.symbol.as_ref())
            .ok_or_else(|| CompileError::undefined_variable(name.text(), name.span()))
    }

    // ========================================================================
    // Class Compilation
    // ========================================================================

    fn compile_class(&mut self, class: &NonTerminal) -> Result<()> {
        self.class_name = class
            .child(NodeKind::ClassName)
            .map(NonTerminal::text)
            .unwrap_or_default();

        self.field_count = vm_count(
            count_names(
                class
                    .children_of(NodeKind::ClassVarDec)
                    .filter(|dec| dec.keyword() == Some(Keyword::Field)),
            ),
            "fields",
            class.span(),
        )?;

        self.subroutines = class
            .children_of(NodeKind::SubroutineDec)
            .filter_map(|dec| {
                let name = dec.child(NodeKind::SubroutineName)?.text();
                let info = SubroutineInfo {
                    kind: dec.keyword()?,
                    params: dec
                        .child(NodeKind::ParameterList)
                        .map_or(0, |p| p.children_of(NodeKind::VarName).count()),
                };
                Some((name, info))
            })
            .collect();

        for dec in class.children_of(NodeKind::SubroutineDec) {
            self.compile_subroutine(dec)?;
        }
        Ok(())
    }

    // ========================================================================
    // Subroutine Compilation
    // ========================================================================

    fn compile_subroutine(&mut self, dec: &NonTerminal) -> Result<()> {
        self.subroutine_name = dec
            .child(NodeKind::SubroutineName)
            .map(NonTerminal::text)
            .unwrap_or_default();
        self.if_counter = 0;
        self.while_counter = 0;

        let Some(body) = dec.child(NodeKind::SubroutineBody) else {
            return Ok(());
        };
        let num_locals = vm_count(
            count_names(body.children_of(NodeKind::VarDec)),
            "local variables",
            dec.span(),
        )?;

        let mut name = String::with_capacity(self.class_name.len() + self.subroutine_name.len() + 1);
        name.push_str(&self.class_name);
        name.push('.');
        name.push_str(&self.subroutine_name);
        self.vm.write_function(name, num_locals);

        match dec.keyword() {
            Some(Keyword::Constructor) => {
                // Allocate the object and anchor `this` on it
                self.vm.write_push(Segment::Constant, self.field_count);
                self.vm.write_call("Memory.alloc".to_string(), 1);
                self.vm.write_pop(Segment::Pointer, 0);
            }
            Some(Keyword::Method) => {
                self.vm.write_push(Segment::Argument, 0);
                self.vm.write_pop(Segment::Pointer, 0);
            }
            _ => {}
        }

        match body.child(NodeKind::Statements) {
            Some(statements) => self.compile_statements(statements),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Statement Compilation
    // ========================================================================

    fn compile_statements(&mut self, statements: &NonTerminal) -> Result<()> {
        for stmt in statements.non_terminals() {
            match stmt.kind {
                NodeKind::LetStatement => self.compile_let(stmt)?,
                NodeKind::IfStatement => self.compile_if(stmt)?,
                NodeKind::WhileStatement => self.compile_while(stmt)?,
                NodeKind::DoStatement => self.compile_do(stmt)?,
                NodeKind::ReturnStatement => self.compile_return(stmt)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Target of a `let`: must be a variable.
    fn assignable<'a>(&self, name: &'a NonTerminal) -> Result<&'a ResolvedVar> {
        Self::variable(name).map_err(|e| {
            let text = name.text();
            if text == self.class_name || self.subroutines.contains_key(&text) {
                CompileError::NotAssignable {
                    name: text,
                    span: name.span(),
                }
            } else {
                e
            }
        })
    }

    fn compile_let(&mut self, stmt: &NonTerminal) -> Result<()> {
        let Some(name) = stmt.child(NodeKind::VarName) else {
            return Ok(());
        };
        let target = self.assignable(name)?;
        let mut expressions = stmt.children_of(NodeKind::Expression);

        if stmt.has_symbol('[') {
            // let a[i] = e
            if let Some(index) = expressions.next() {
                self.compile_expression(index)?;
            }
            self.push_var(target);
            self.vm.write_arithmetic(ArithmeticOp::Add);
            if let Some(value) = expressions.next() {
                self.compile_expression(value)?;
            }
            // `e` may itself have moved `pointer 1`
            self.vm.write_pop(Segment::Temp, 0);
            self.vm.write_pop(Segment::Pointer, 1);
            self.vm.write_push(Segment::Temp, 0);
            self.vm.write_pop(Segment::That, 0);
        } else {
            if let Some(value) = expressions.next() {
                self.compile_expression(value)?;
            }
            self.pop_var(target);
        }
        Ok(())
    }

    fn compile_if(&mut self, stmt: &NonTerminal) -> Result<()> {
        let n = self.if_counter;
        self.if_counter += 1;
        let else_label = self.label(n, "IF.ELSE");
        let end_label = self.label(n, "IF.END");

        if let Some(condition) = stmt.child(NodeKind::Expression) {
            self.compile_expression(condition)?;
        }
        self.vm.write_arithmetic(ArithmeticOp::Not);
        self.vm.write_if(else_label.clone());

        let mut blocks = stmt.children_of(NodeKind::Statements);
        if let Some(then_block) = blocks.next() {
            self.compile_statements(then_block)?;
        }
        self.vm.write_goto(end_label.clone());

        self.vm.write_label(else_label);
        if let Some(else_block) = blocks.next() {
            self.compile_statements(else_block)?;
        }
        self.vm.write_label(end_label);
        Ok(())
    }

    fn compile_while(&mut self, stmt: &NonTerminal) -> Result<()> {
        let n = self.while_counter;
        self.while_counter += 1;
        let cont_label = self.label(n, "WHILE.CONT");
        let end_label = self.label(n, "WHILE.END");

        self.vm.write_label(cont_label.clone());
        if let Some(condition) = stmt.child(NodeKind::Expression) {
            self.compile_expression(condition)?;
        }
        self.vm.write_arithmetic(ArithmeticOp::Not);
        self.vm.write_if(end_label.clone());

        if let Some(body) = stmt.child(NodeKind::Statements) {
            self.compile_statements(body)?;
        }
        self.vm.write_goto(cont_label);
        self.vm.write_label(end_label);
        Ok(())
    }

    fn compile_do(&mut self, stmt: &NonTerminal) -> Result<()> {
        if let Some(call) = stmt.child(NodeKind::SubroutineCall) {
            self.compile_subroutine_call(call)?;
        }
        // Discard the return value
        self.vm.write_pop(Segment::Temp, 0);
        Ok(())
    }

    fn compile_return(&mut self, stmt: &NonTerminal) -> Result<()> {
        match stmt.child(NodeKind::Expression) {
            Some(value) => self.compile_expression(value)?,
            None => self.vm.write_push(Segment::Constant, 0),
        }
        self.vm.write_return();
        Ok(())
    }

    // ========================================================================
    // Expression Compilation
    // ========================================================================

    /// `term (op term)*`, strictly left to right.
    fn compile_expression(&mut self, expr: &NonTerminal) -> Result<()> {
        let mut pending: Option<char> = None;
        for child in expr.non_terminals() {
            match child.kind {
                NodeKind::Term => {
                    self.compile_term(child)?;
                    if let Some(op) = pending.take() {
                        self.compile_binary_op(op);
                    }
                }
                NodeKind::Op => pending = symbol_of(child),
                _ => {}
            }
        }
        Ok(())
    }

    fn compile_term(&mut self, term: &NonTerminal) -> Result<()> {
        let Some(first) = term.children.first() else {
            return Ok(());
        };

        match first {
            Node::Terminal(t) => match &t.token {
                Token::IntegerConstant(n) => self.vm.write_push(Segment::Constant, *n),
                Token::StringConstant(s) => self.compile_string(s, t.span)?,
                // '(' expression ')'
                _ => {
                    if let Some(inner) = term.child(NodeKind::Expression) {
                        self.compile_expression(inner)?;
                    }
                }
            },
            Node::NonTerminal(inner) => match inner.kind {
                NodeKind::KeywordConstant => self.compile_keyword(inner.keyword()),
                NodeKind::UnaryOp => {
                    if let Some(operand) = term.child(NodeKind::Term) {
                        self.compile_term(operand)?;
                    }
                    let op = if symbol_of(inner) == Some('-') {
                        ArithmeticOp::Neg
                    } else {
                        ArithmeticOp::Not
                    };
                    self.vm.write_arithmetic(op);
                }
                NodeKind::SubroutineCall => self.compile_subroutine_call(inner)?,
                NodeKind::VarName => {
                    let var = Self::variable(inner)?;
                    match term.child(NodeKind::Expression) {
                        // a[e]
                        Some(index) => {
                            self.compile_expression(index)?;
                            self.push_var(var);
                            self.vm.write_arithmetic(ArithmeticOp::Add);
                            self.vm.write_pop(Segment::Pointer, 1);
                            self.vm.write_push(Segment::That, 0);
                        }
                        None => self.push_var(var),
                    }
                }
                _ => {}
            },
        }
        Ok(())
    }

    /// `String.new(len)` followed by one `appendChar` per character.
    fn compile_string(&mut self, s: &str, span: Span) -> Result<()> {
        let chars = s
            .chars()
            .map(|c| u16::try_from(u32::from(c)).ok().filter(|&c| c <= MAX_INT))
            .collect::<Option<Vec<u16>>>()
            .ok_or(CompileError::InvalidStringChar { span })?;
        let len = u16::try_from(chars.len())
            .ok()
            .filter(|&n| n <= MAX_INT)
            .ok_or(CompileError::InvalidStringChar { span })?;

        self.vm.write_push(Segment::Constant, len);
        self.vm.write_call("String.new".to_string(), 1);
        for c in chars {
            self.vm.write_push(Segment::Constant, c);
            self.vm.write_call("String.appendChar".to_string(), 2);
        }
        Ok(())
    }

    #[inline]
    fn compile_keyword(&mut self, keyword: Option<Keyword>) {
        match keyword {
            Some(Keyword::True) => {
                self.vm.write_push(Segment::Constant, 0);
                self.vm.write_arithmetic(ArithmeticOp::Not);
            }
            Some(Keyword::This) => self.vm.write_push(Segment::Pointer, 0),
            // false, null
            _ => self.vm.write_push(Segment::Constant, 0),
        }
    }

    #[inline]
    fn compile_binary_op(&mut self, op: char) {
        match op {
            '+' => self.vm.write_arithmetic(ArithmeticOp::Add),
            '-' => self.vm.write_arithmetic(ArithmeticOp::Sub),
            '*' => self.vm.write_call("Math.multiply".to_string(), 2),
            '/' => self.vm.write_call("Math.divide".to_string(), 2),
            '&' => self.vm.write_arithmetic(ArithmeticOp::And),
            '|' => self.vm.write_arithmetic(ArithmeticOp::Or),
            '<' => self.vm.write_arithmetic(ArithmeticOp::Lt),
            '>' => self.vm.write_arithmetic(ArithmeticOp::Gt),
            '=' => self.vm.write_arithmetic(ArithmeticOp::Eq),
            _ => {}
        }
    }

    // ========================================================================
    // Subroutine Calls
    // ========================================================================

    fn compile_arguments(&mut self, args: Option<&NonTerminal>) -> Result<()> {
        if let Some(args) = args {
            for arg in args.children_of(NodeKind::Expression) {
                self.compile_expression(arg)?;
            }
        }
        Ok(())
    }

    /// `f(args)`, `obj.f(args)` or `Cls.f(args)`.
    fn compile_subroutine_call(&mut self, call: &NonTerminal) -> Result<()> {
        let Some(name_node) = call.child(NodeKind::SubroutineName) else {
            return Ok(());
        };
        let name = name_node.text();
        let span = name_node.span();
        let args = call.child(NodeKind::ExpressionList);
        let arg_count = args.map_or(0, |a| a.children_of(NodeKind::Expression).count());

        match call.children.first() {
            Some(Node::Terminal(qualifier)) => {
                let qualifier_name = qualifier.token.as_identifier().unwrap_or_default();
                match qualifier.ident.as_ref().and_then(|info| info.symbol.as_ref()) {
                    // Method call on a variable
                    Some(var) => {
                        if is_primitive(&var.ty) {
                            return Err(CompileError::malformed_call(
                                format!("{}.{}", qualifier_name, name),
                                span,
                                format!("'{}' has primitive type {}", qualifier_name, var.ty),
                            ));
                        }
                        self.push_var(var);
                        self.compile_arguments(args)?;
                        self.emit_call(&var.ty, &name, arg_count, true, span)
                    }
                    // Function or constructor of a class
                    None => {
                        self.compile_arguments(args)?;
                        self.emit_call(qualifier_name, &name, arg_count, false, span)
                    }
                }
            }
            // Method call on the current object
            _ => {
                self.vm.write_push(Segment::Pointer, 0);
                self.compile_arguments(args)?;
                let class_name = self.class_name.clone();
                self.emit_call(&class_name, &name, arg_count, true, span)
            }
        }
    }

    /// Emit `call Class.name n`, counting the receiver for method calls.
    fn emit_call(
        &mut self,
        class: &str,
        name: &str,
        arg_count: usize,
        is_method: bool,
        span: Span,
    ) -> Result<()> {
        let mut full_name = String::with_capacity(class.len() + name.len() + 1);
        full_name.push_str(class);
        full_name.push('.');
        full_name.push_str(name);

        // Only subroutines of the current class are known here
        if class == self.class_name
            && let Some(info) = self.subroutines.get(name)
        {
            let is_method_target = info.kind == Keyword::Method;
            if is_method && !is_method_target {
                return Err(CompileError::malformed_call(
                    full_name,
                    span,
                    "not a method, call it as a function",
                ));
            }
            if !is_method && is_method_target {
                return Err(CompileError::malformed_call(
                    full_name,
                    span,
                    "method called without an object",
                ));
            }
            if info.params != arg_count {
                return Err(CompileError::ArityMismatch {
                    name: full_name,
                    expected: info.params,
                    found: arg_count,
                    span,
                });
            }
        }

        let num_args = vm_count(arg_count + usize::from(is_method), "arguments", span)?;
        self.vm.write_call(full_name, num_args);
        Ok(())
    }
}
