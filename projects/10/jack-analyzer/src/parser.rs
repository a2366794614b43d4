//! Recursive descent parser (Compilation Engine) for the Jack language.
//!
//! Builds a [`NonTerminal`] tree over a token slice. The unconsumed tail is
//! always `tokens[pos..]`; each grammar rule consumes its prefix and returns
//! the subtree, or the first syntax error.

use crate::error::{JackError, Result};
use crate::token::{Keyword, Span, SpannedToken, Token};
use crate::tree::{Node, NodeKind, NonTerminal};

/// Maximum term nesting depth before the parser bails out. Each
/// parenthesis, unary operator, array index or call argument opens one term.
/// Keeps `(((((...)))))` from exhausting the stack in the recursive passes.
pub const MAX_DEPTH: usize = 256;

const BINARY_OPS: &[char] = &['+', '-', '*', '/', '&', '|', '<', '>', '='];

/// Recursive descent parser for Jack language.
pub struct Parser<'a> {
    tokens: &'a [SpannedToken],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given tokens.
    pub fn new(tokens: &'a [SpannedToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse exactly one class; trailing tokens are an error.
    pub fn parse(mut self) -> Result<NonTerminal> {
        let class = self.parse_class()?;
        if let Some(extra) = self.current() {
            return Err(JackError::syntax(
                extra.span,
                "end of file",
                extra.token.to_string(),
            ));
        }
        Ok(class)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn current(&self) -> Option<&'a SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&'a Token> {
        self.current().map(|t| &t.token)
    }

    fn peek_second(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos + 1).map(|t| &t.token)
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        match self.peek_token() {
            Some(Token::Keyword(k)) => Some(*k),
            _ => None,
        }
    }

    fn peek_symbol(&self) -> Option<char> {
        match self.peek_token() {
            Some(Token::Symbol(c)) => Some(*c),
            _ => None,
        }
    }

    /// Span of the current token, or the end of the last one at EOF.
    fn current_span(&self) -> Span {
        match (self.current(), self.tokens.last()) {
            (Some(t), _) => t.span,
            (None, Some(last)) => Span::new(
                last.span.end,
                last.span.end,
                last.span.line,
                last.span.column + (last.span.end - last.span.start),
            ),
            (None, None) => Span::new(0, 0, 1, 1),
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> JackError {
        let found = self
            .peek_token()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "end of file".to_string());
        JackError::syntax(self.current_span(), expected, found)
    }

    /// Consume the current token as a terminal.
    fn take(&mut self) -> Result<Node> {
        let t = self.current().ok_or_else(|| self.unexpected("a token"))?;
        self.pos += 1;
        Ok(Node::terminal(t.token.clone(), t.span))
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<Node> {
        if self.peek_keyword() == Some(keyword) {
            self.take()
        } else {
            Err(self.unexpected(format!("'{}'", keyword.as_str())))
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<Node> {
        if self.peek_symbol() == Some(symbol) {
            self.take()
        } else {
            Err(self.unexpected(format!("'{}'", symbol)))
        }
    }

    fn expect_identifier(&mut self) -> Result<Node> {
        if matches!(self.peek_token(), Some(Token::Identifier(_))) {
            self.take()
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    /// An identifier wrapped in a synthetic name node.
    fn name(&mut self, kind: NodeKind) -> Result<Node> {
        Ok(Node::non_terminal(kind, vec![self.expect_identifier()?]))
    }

    /// Enter one level of term nesting.
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(JackError::NestingTooDeep {
                span: self.current_span(),
                limit: MAX_DEPTH,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Program structure
    // ========================================================================

    /// class: 'class' className '{' classVarDec* subroutineDec* '}'
    fn parse_class(&mut self) -> Result<NonTerminal> {
        let mut children = vec![
            self.expect_keyword(Keyword::Class)?,
            self.name(NodeKind::ClassName)?,
            self.expect_symbol('{')?,
        ];

        while matches!(self.peek_keyword(), Some(Keyword::Static | Keyword::Field)) {
            children.push(self.parse_class_var_dec()?);
        }

        while matches!(
            self.peek_keyword(),
            Some(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            children.push(self.parse_subroutine_dec()?);
        }

        if self.peek_symbol() != Some('}') {
            return Err(self.unexpected("'static', 'field', 'constructor', 'function', 'method' or '}'"));
        }
        children.push(self.take()?);

        Ok(NonTerminal {
            kind: NodeKind::Class,
            children,
        })
    }

    /// classVarDec: ('static' | 'field') type varName (',' varName)* ';'
    fn parse_class_var_dec(&mut self) -> Result<Node> {
        let mut children = vec![self.take()?, self.parse_type()?];
        self.parse_name_list(&mut children)?;
        Ok(Node::non_terminal(NodeKind::ClassVarDec, children))
    }

    /// varName (',' varName)* ';'
    fn parse_name_list(&mut self, children: &mut Vec<Node>) -> Result<()> {
        children.push(self.name(NodeKind::VarName)?);
        while self.peek_symbol() == Some(',') {
            children.push(self.take()?);
            children.push(self.name(NodeKind::VarName)?);
        }
        children.push(self.expect_symbol(';')?);
        Ok(())
    }

    /// type: 'int' | 'char' | 'boolean' | className
    fn parse_type(&mut self) -> Result<Node> {
        let inner = match self.peek_token() {
            Some(Token::Keyword(Keyword::Int | Keyword::Char | Keyword::Boolean)) => self.take()?,
            Some(Token::Identifier(_)) => self.name(NodeKind::ClassName)?,
            _ => return Err(self.unexpected("type")),
        };
        Ok(Node::non_terminal(NodeKind::Type, vec![inner]))
    }

    /// subroutineDec: ('constructor'|'function'|'method') ('void'|type) subroutineName
    ///                '(' parameterList ')' subroutineBody
    fn parse_subroutine_dec(&mut self) -> Result<Node> {
        let mut children = vec![self.take()?];

        if self.peek_keyword() == Some(Keyword::Void) {
            children.push(self.take()?);
        } else {
            children.push(self.parse_type()?);
        }

        children.push(self.name(NodeKind::SubroutineName)?);
        children.push(self.expect_symbol('(')?);
        children.push(self.parse_parameter_list()?);
        children.push(self.expect_symbol(')')?);
        children.push(self.parse_subroutine_body()?);

        Ok(Node::non_terminal(NodeKind::SubroutineDec, children))
    }

    /// parameterList: ((type varName) (',' type varName)*)?
    fn parse_parameter_list(&mut self) -> Result<Node> {
        let mut children = Vec::new();

        if self.peek_symbol() != Some(')') {
            children.push(self.parse_type()?);
            children.push(self.name(NodeKind::VarName)?);
            while self.peek_symbol() == Some(',') {
                children.push(self.take()?);
                children.push(self.parse_type()?);
                children.push(self.name(NodeKind::VarName)?);
            }
        }

        Ok(Node::non_terminal(NodeKind::ParameterList, children))
    }

    /// subroutineBody: '{' varDec* statements '}'
    fn parse_subroutine_body(&mut self) -> Result<Node> {
        let mut children = vec![self.expect_symbol('{')?];

        while self.peek_keyword() == Some(Keyword::Var) {
            let mut dec = vec![self.take()?, self.parse_type()?];
            self.parse_name_list(&mut dec)?;
            children.push(Node::non_terminal(NodeKind::VarDec, dec));
        }

        children.push(self.parse_statements()?);
        children.push(self.expect_symbol('}')?);

        Ok(Node::non_terminal(NodeKind::SubroutineBody, children))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// statements: statement*
    fn parse_statements(&mut self) -> Result<Node> {
        let mut children = Vec::new();

        loop {
            let statement = match self.peek_keyword() {
                Some(Keyword::Let) => self.parse_let_statement()?,
                Some(Keyword::If) => self.parse_if_statement()?,
                Some(Keyword::While) => self.parse_while_statement()?,
                Some(Keyword::Do) => self.parse_do_statement()?,
                Some(Keyword::Return) => self.parse_return_statement()?,
                _ => break,
            };
            children.push(statement);
        }

        Ok(Node::non_terminal(NodeKind::Statements, children))
    }

    /// letStatement: 'let' varName ('[' expression ']')? '=' expression ';'
    fn parse_let_statement(&mut self) -> Result<Node> {
        let mut children = vec![self.take()?, self.name(NodeKind::VarName)?];

        if self.peek_symbol() == Some('[') {
            children.push(self.take()?);
            children.push(self.parse_expression()?);
            children.push(self.expect_symbol(']')?);
        }

        children.push(self.expect_symbol('=')?);
        children.push(self.parse_expression()?);
        children.push(self.expect_symbol(';')?);

        Ok(Node::non_terminal(NodeKind::LetStatement, children))
    }

    /// '{' statements '}'
    fn parse_block(&mut self, children: &mut Vec<Node>) -> Result<()> {
        children.push(self.expect_symbol('{')?);
        children.push(self.parse_statements()?);
        children.push(self.expect_symbol('}')?);
        Ok(())
    }

    /// '(' expression ')'
    fn parse_condition(&mut self, children: &mut Vec<Node>) -> Result<()> {
        children.push(self.expect_symbol('(')?);
        children.push(self.parse_expression()?);
        children.push(self.expect_symbol(')')?);
        Ok(())
    }

    /// ifStatement: 'if' '(' expression ')' '{' statements '}' ('else' '{' statements '}')?
    fn parse_if_statement(&mut self) -> Result<Node> {
        let mut children = vec![self.take()?];
        self.parse_condition(&mut children)?;
        self.parse_block(&mut children)?;

        if self.peek_keyword() == Some(Keyword::Else) {
            children.push(self.take()?);
            self.parse_block(&mut children)?;
        }

        Ok(Node::non_terminal(NodeKind::IfStatement, children))
    }

    /// whileStatement: 'while' '(' expression ')' '{' statements '}'
    fn parse_while_statement(&mut self) -> Result<Node> {
        let mut children = vec![self.take()?];
        self.parse_condition(&mut children)?;
        self.parse_block(&mut children)?;
        Ok(Node::non_terminal(NodeKind::WhileStatement, children))
    }

    /// doStatement: 'do' subroutineCall ';'
    fn parse_do_statement(&mut self) -> Result<Node> {
        let keyword = self.take()?;
        let name = self.expect_identifier()?;
        let call = self.parse_subroutine_call(name)?;
        let semicolon = self.expect_symbol(';')?;
        Ok(Node::non_terminal(
            NodeKind::DoStatement,
            vec![keyword, call, semicolon],
        ))
    }

    /// returnStatement: 'return' expression? ';'
    fn parse_return_statement(&mut self) -> Result<Node> {
        let mut children = vec![self.take()?];
        if self.peek_symbol() != Some(';') {
            children.push(self.parse_expression()?);
        }
        children.push(self.expect_symbol(';')?);
        Ok(Node::non_terminal(NodeKind::ReturnStatement, children))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// expression: term (op term)*
    fn parse_expression(&mut self) -> Result<Node> {
        let mut children = vec![self.parse_term()?];

        while let Some(c) = self.peek_symbol()
            && BINARY_OPS.contains(&c)
        {
            children.push(Node::non_terminal(NodeKind::Op, vec![self.take()?]));
            children.push(self.parse_term()?);
        }

        Ok(Node::non_terminal(NodeKind::Expression, children))
    }

    /// term: integerConstant | stringConstant | keywordConstant | varName
    ///     | varName '[' expression ']' | subroutineCall | '(' expression ')'
    ///     | unaryOp term
    fn parse_term(&mut self) -> Result<Node> {
        self.descend()?;

        let children = match self.peek_token() {
            Some(Token::IntegerConstant(_) | Token::StringConstant(_)) => vec![self.take()?],
            Some(Token::Keyword(Keyword::True | Keyword::False | Keyword::Null | Keyword::This)) => {
                vec![Node::non_terminal(NodeKind::KeywordConstant, vec![self.take()?])]
            }
            Some(Token::Symbol('(')) => {
                let mut children = Vec::with_capacity(3);
                self.parse_condition(&mut children)?;
                children
            }
            Some(Token::Symbol('-' | '~')) => {
                let op = Node::non_terminal(NodeKind::UnaryOp, vec![self.take()?]);
                vec![op, self.parse_term()?]
            }
            // Two-token look-ahead: `[` array, `(` or `.` call, else a variable
            Some(Token::Identifier(_)) => match self.peek_second() {
                Some(Token::Symbol('[')) => vec![
                    self.name(NodeKind::VarName)?,
                    self.take()?,
                    self.parse_expression()?,
                    self.expect_symbol(']')?,
                ],
                Some(Token::Symbol('(' | '.')) => {
                    let name = self.take()?;
                    vec![self.parse_subroutine_call(name)?]
                }
                _ => vec![self.name(NodeKind::VarName)?],
            },
            _ => return Err(self.unexpected("term")),
        };

        self.depth -= 1;
        Ok(Node::non_terminal(NodeKind::Term, children))
    }

    /// subroutineCall: subroutineName '(' expressionList ')'
    ///               | (className | varName) '.' subroutineName '(' expressionList ')'
    ///
    /// `first` is the already consumed leading identifier. A qualifier stays a
    /// bare identifier; whether it names a class or a variable is decided
    /// during name resolution.
    fn parse_subroutine_call(&mut self, first: Node) -> Result<Node> {
        let mut children = Vec::with_capacity(6);

        if self.peek_symbol() == Some('.') {
            children.push(first);
            children.push(self.take()?);
            children.push(self.name(NodeKind::SubroutineName)?);
        } else {
            children.push(Node::non_terminal(NodeKind::SubroutineName, vec![first]));
        }

        children.push(self.expect_symbol('(')?);
        children.push(self.parse_expression_list()?);
        children.push(self.expect_symbol(')')?);

        Ok(Node::non_terminal(NodeKind::SubroutineCall, children))
    }

    /// expressionList: (expression (',' expression)*)?
    fn parse_expression_list(&mut self) -> Result<Node> {
        let mut children = Vec::new();

        if self.peek_symbol() != Some(')') {
            children.push(self.parse_expression()?);
            while self.peek_symbol() == Some(',') {
                children.push(self.take()?);
                children.push(self.parse_expression()?);
            }
        }

        Ok(Node::non_terminal(NodeKind::ExpressionList, children))
    }
}
