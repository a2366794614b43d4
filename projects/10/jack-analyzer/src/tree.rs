//! Concrete syntax tree for Jack classes.
//!
//! Every node is either a terminal (one token) or a non-terminal owning its
//! children in source order, punctuation included. Grammar non-terminals
//! appear in XML output; the synthetic wrappers (`type`, `className`,
//! `varName`, ...) only label positions for later passes.

use crate::token::{Keyword, Span, Token};

/// Non-terminal node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Class,
    ClassVarDec,
    SubroutineDec,
    ParameterList,
    SubroutineBody,
    VarDec,
    Statements,
    LetStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    Expression,
    Term,
    ExpressionList,
    // Synthetic wrappers
    Type,
    ClassName,
    SubroutineName,
    VarName,
    Op,
    UnaryOp,
    KeywordConstant,
    SubroutineCall,
}

impl NodeKind {
    /// Tag name in the course XML format.
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Class => "class",
            NodeKind::ClassVarDec => "classVarDec",
            NodeKind::SubroutineDec => "subroutineDec",
            NodeKind::ParameterList => "parameterList",
            NodeKind::SubroutineBody => "subroutineBody",
            NodeKind::VarDec => "varDec",
            NodeKind::Statements => "statements",
            NodeKind::LetStatement => "letStatement",
            NodeKind::IfStatement => "ifStatement",
            NodeKind::WhileStatement => "whileStatement",
            NodeKind::DoStatement => "doStatement",
            NodeKind::ReturnStatement => "returnStatement",
            NodeKind::Expression => "expression",
            NodeKind::Term => "term",
            NodeKind::ExpressionList => "expressionList",
            NodeKind::Type => "type",
            NodeKind::ClassName => "className",
            NodeKind::SubroutineName => "subroutineName",
            NodeKind::VarName => "varName",
            NodeKind::Op => "op",
            NodeKind::UnaryOp => "unaryOp",
            NodeKind::KeywordConstant => "keywordConstant",
            NodeKind::SubroutineCall => "subroutineCall",
        }
    }

    /// Synthetic wrappers are transparent in XML output.
    pub fn is_synthetic(self) -> bool {
        matches!(
            self,
            NodeKind::Type
                | NodeKind::ClassName
                | NodeKind::SubroutineName
                | NodeKind::VarName
                | NodeKind::Op
                | NodeKind::UnaryOp
                | NodeKind::KeywordConstant
                | NodeKind::SubroutineCall
        )
    }

    /// Non-terminals whose `varName` / `className` / `subroutineName`
    /// children introduce a name.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::Class
                | NodeKind::ClassVarDec
                | NodeKind::SubroutineDec
                | NodeKind::ParameterList
                | NodeKind::VarDec
        )
    }
}

/// Variable kinds of the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Static,
    Field,
    Argument,
    Var,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Static => "static",
            VarKind::Field => "field",
            VarKind::Argument => "argument",
            VarKind::Var => "var",
        }
    }
}

/// What an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentCategory {
    Var,
    Arg,
    Static,
    Field,
    Class,
    Sub,
}

impl From<VarKind> for IdentCategory {
    fn from(kind: VarKind) -> Self {
        match kind {
            VarKind::Static => IdentCategory::Static,
            VarKind::Field => IdentCategory::Field,
            VarKind::Argument => IdentCategory::Arg,
            VarKind::Var => IdentCategory::Var,
        }
    }
}

/// A resolved variable, copied out of the symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVar {
    pub kind: VarKind,
    pub ty: String,
    pub index: u16,
}

/// Metadata attached to an identifier leaf by name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentInfo {
    pub category: IdentCategory,
    pub declaration: bool,
    /// Present for variables.
    pub symbol: Option<ResolvedVar>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    pub token: Token,
    pub span: Span,
    pub ident: Option<IdentInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Node {
    pub fn terminal(token: Token, span: Span) -> Self {
        Node::Terminal(Terminal {
            token,
            span,
            ident: None,
        })
    }

    pub fn non_terminal(kind: NodeKind, children: Vec<Node>) -> Self {
        Node::NonTerminal(NonTerminal { kind, children })
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Node::Terminal(t) => Some(t),
            Node::NonTerminal(_) => None,
        }
    }

    pub fn as_non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Node::NonTerminal(n) => Some(n),
            Node::Terminal(_) => None,
        }
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.as_non_terminal().map(|n| n.kind)
    }

    pub fn token(&self) -> Option<&Token> {
        self.as_terminal().map(|t| &t.token)
    }

    pub fn is_symbol(&self, symbol: char) -> bool {
        self.token().is_some_and(|t| t.is_symbol(symbol))
    }

    /// Terminals in source order.
    pub fn terminals(&self) -> Vec<&Terminal> {
        let mut out = Vec::new();
        self.collect_terminals(&mut out);
        out
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a Terminal>) {
        match self {
            Node::Terminal(t) => out.push(t),
            Node::NonTerminal(n) => n.children.iter().for_each(|c| c.collect_terminals(out)),
        }
    }

    /// First terminal in source order.
    pub fn first_terminal(&self) -> Option<&Terminal> {
        match self {
            Node::Terminal(t) => Some(t),
            Node::NonTerminal(n) => n.children.iter().find_map(Node::first_terminal),
        }
    }
}

impl NonTerminal {
    /// First child non-terminal of the given kind.
    pub fn child(&self, kind: NodeKind) -> Option<&NonTerminal> {
        self.children_of(kind).next()
    }

    pub fn children_of(&self, kind: NodeKind) -> impl Iterator<Item = &NonTerminal> {
        self.children
            .iter()
            .filter_map(Node::as_non_terminal)
            .filter(move |n| n.kind == kind)
    }

    /// Child non-terminals regardless of kind.
    pub fn non_terminals(&self) -> impl Iterator<Item = &NonTerminal> {
        self.children.iter().filter_map(Node::as_non_terminal)
    }

    /// The leading keyword, e.g. `static` in a `classVarDec`.
    pub fn keyword(&self) -> Option<Keyword> {
        match self.children.first().and_then(Node::token) {
            Some(Token::Keyword(k)) => Some(*k),
            _ => None,
        }
    }

    pub fn has_symbol(&self, symbol: char) -> bool {
        self.children.iter().any(|c| c.is_symbol(symbol))
    }

    /// First terminal below this node.
    pub fn first_terminal(&self) -> Option<&Terminal> {
        self.children.iter().find_map(Node::first_terminal)
    }

    /// Source text of a single-token wrapper such as `varName` or `type`.
    pub fn text(&self) -> String {
        self.first_terminal()
            .map(|t| match &t.token {
                Token::Identifier(name) => name.clone(),
                other => other.lexeme(),
            })
            .unwrap_or_default()
    }

    pub fn span(&self) -> Span {
        self.first_terminal().map(|t| t.span).unwrap_or_default()
    }

    pub fn terminals(&self) -> Vec<&Terminal> {
        let mut out = Vec::new();
        for child in &self.children {
            child.collect_terminals(&mut out);
        }
        out
    }
}
