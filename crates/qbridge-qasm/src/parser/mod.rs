//! Parser for `OpenQASM` 2.0.

mod expression;
mod lowering;
mod statement;

use qbridge_ir::Circuit;

use crate::ast::Program;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token, line_of, tokenize};

/// Parse a QASM 2 source string into a Circuit.
pub fn parse(source: &str) -> ParseResult<Circuit> {
    let program = parse_ast(source)?;
    lowering::lower_to_circuit(&program)
}

/// Parse a QASM 2 source string into an AST Program.
pub fn parse_ast(source: &str) -> ParseResult<Program> {
    Parser::new(source)?.parse_program()
}

/// Parser state.
pub(super) struct Parser<'src> {
    source: &'src str,
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> ParseResult<Self> {
        let mut tokens = Vec::new();
        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, message)) => {
                    return Err(ParseError::LexerError {
                        line: line_of(source, span.start),
                        message,
                    });
                }
            }
        }
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    pub(super) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Line of the most recently consumed token.
    pub(super) fn line(&self) -> usize {
        let idx = self.pos.saturating_sub(1);
        self.tokens
            .get(idx)
            .map_or(1, |t| line_of(self.source, t.span.start))
    }

    pub(super) fn unexpected(&self, expected: &str, found: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            line: self.line(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        let found = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof(format!("expected {expected}")))?;
        if std::mem::discriminant(&found) != std::mem::discriminant(&expected) {
            return Err(self.unexpected(&expected.to_string(), &found));
        }
        Ok(())
    }

    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_program(&mut self) -> ParseResult<Program> {
        let version = if self.consume(&Token::OpenQasm) {
            let version = self.parse_version()?;
            self.expect(Token::Semicolon)?;
            Some(version)
        } else {
            None
        };

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            version,
            statements,
        })
    }

    fn parse_version(&mut self) -> ParseResult<String> {
        let version = match self.advance() {
            Some(Token::Real(v)) => format!("{v:.1}"),
            Some(Token::Integer(v)) => format!("{v}.0"),
            Some(other) => return Err(ParseError::InvalidVersion(other.to_string())),
            None => return Err(ParseError::UnexpectedEof("version number".into())),
        };
        if !version.starts_with("2.") {
            return Err(ParseError::InvalidVersion(version));
        }
        Ok(version)
    }

    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.advance() {
            Some(Token::Ident(s)) => Ok(s),
            Some(other) => Err(self.unexpected("identifier", &other)),
            None => Err(ParseError::UnexpectedEof("identifier".into())),
        }
    }

    pub(super) fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    pub(super) fn parse_integer(&mut self) -> ParseResult<u64> {
        match self.advance() {
            Some(Token::Integer(v)) => Ok(v),
            Some(other) => Err(self.unexpected("integer", &other)),
            None => Err(ParseError::UnexpectedEof("integer".into())),
        }
    }

    pub(super) fn parse_index(&mut self) -> ParseResult<u32> {
        let value = self.parse_integer()?;
        u32::try_from(value).map_err(|_| ParseError::UnexpectedToken {
            line: self.line(),
            expected: "index below 2^32".into(),
            found: value.to_string(),
        })
    }
}
