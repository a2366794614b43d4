//! Lexical analyzer (tokenizer) for the Jack language.
//!
//! A single forward scan with a pending buffer and three modes: ordinary
//! text, block comment and string literal. In ordinary mode whitespace and
//! the symbol punctuators are delimiters; a delimiter flushes the buffer into
//! a keyword, integer constant or identifier token.

use crate::error::{JackError, Result};
use crate::token::{Keyword, MAX_INT, Span, SpannedToken, Token, is_identifier, is_symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Ordinary,
    BlockComment,
    String,
}

/// Position of the first character of a pending token.
#[derive(Debug, Clone, Copy)]
struct Mark {
    offset: usize,
    line: usize,
    column: usize,
}

/// Jack language tokenizer.
pub struct JackTokenizer {
    chars: Vec<char>,
    pos: usize,
    byte_offset: usize,
    line: usize,
    column: usize,
    mode: Mode,
    buffer: String,
    /// Start of the buffered token, or of the open comment / string.
    mark: Mark,
    tokens: Vec<SpannedToken>,
}

impl JackTokenizer {
    /// Create a new tokenizer for the given input.
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            byte_offset: 0,
            line: 1,
            column: 1,
            mode: Mode::Ordinary,
            buffer: String::new(),
            mark: Mark {
                offset: 0,
                line: 1,
                column: 1,
            },
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input, stopping at the first lexical error.
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>> {
        while let Some(c) = self.peek() {
            match self.mode {
                Mode::Ordinary => self.ordinary(c)?,
                Mode::BlockComment => {
                    if c == '*' && self.peek_next() == Some('/') {
                        self.advance();
                        self.mode = Mode::Ordinary;
                    }
                    self.advance();
                }
                Mode::String => {
                    if c == '\n' {
                        return Err(JackError::lexical(
                            self.mark_span(),
                            "newline in string constant",
                        ));
                    }
                    self.advance();
                    if c == '"' {
                        let text = std::mem::take(&mut self.buffer);
                        self.emit(Token::StringConstant(text));
                        self.mode = Mode::Ordinary;
                    } else {
                        self.buffer.push(c);
                    }
                }
            }
        }

        match self.mode {
            Mode::Ordinary => {
                self.flush()?;
                Ok(self.tokens)
            }
            Mode::BlockComment => Err(JackError::lexical(
                self.mark_span(),
                "unterminated block comment",
            )),
            Mode::String => Err(JackError::lexical(
                self.mark_span(),
                "unterminated string constant",
            )),
        }
    }

    fn ordinary(&mut self, c: char) -> Result<()> {
        if c == '/' && self.peek_next() == Some('/') {
            self.flush()?;
            while self.peek().is_some_and(|c| c != '\n') {
                self.advance();
            }
        } else if c == '/' && self.peek_next() == Some('*') {
            self.flush()?;
            self.set_mark();
            self.advance();
            self.advance();
            self.mode = Mode::BlockComment;
        } else if c == '"' {
            self.flush()?;
            self.set_mark();
            self.advance();
            self.mode = Mode::String;
        } else if c.is_whitespace() {
            self.flush()?;
            self.advance();
        } else if is_symbol(c) {
            self.flush()?;
            self.set_mark();
            self.advance();
            self.emit(Token::Symbol(c));
        } else {
            if self.buffer.is_empty() {
                self.set_mark();
            }
            self.buffer.push(c);
            self.advance();
        }
        Ok(())
    }

    /// Classify the pending buffer and emit it as a token.
    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.buffer);

        let token = if let Some(keyword) = Keyword::parse_keyword(&text) {
            Token::Keyword(keyword)
        } else if text.bytes().all(|b| b.is_ascii_digit()) {
            match text.parse::<u32>() {
                Ok(n) if n <= MAX_INT as u32 => Token::IntegerConstant(n as u16),
                _ => {
                    return Err(JackError::lexical(
                        self.mark_span(),
                        format!("integer constant {} exceeds maximum value {}", text, MAX_INT),
                    ));
                }
            }
        } else if is_identifier(&text) {
            Token::Identifier(text)
        } else {
            return Err(JackError::lexical(
                self.mark_span(),
                format!("unrecognized token '{}'", text),
            ));
        };

        self.emit(token);
        Ok(())
    }

    fn emit(&mut self, token: Token) {
        let span = self.mark_span();
        self.tokens.push(SpannedToken::new(token, span));
    }

    fn set_mark(&mut self) {
        self.mark = Mark {
            offset: self.byte_offset,
            line: self.line,
            column: self.column,
        };
    }

    /// Span from the mark to the current position.
    fn mark_span(&self) -> Span {
        Span::new(
            self.mark.offset,
            self.byte_offset,
            self.mark.line,
            self.mark.column,
        )
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    /// Advance to the next character, updating byte offset incrementally.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        self.byte_offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}
