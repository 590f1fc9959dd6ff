//! Statement parsing.

use super::Parser;
use crate::ast::{Argument, GateCall, GateDef, Operation, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser<'_> {
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        match token {
            Token::Include => self.parse_include(),
            Token::QReg | Token::CReg => self.parse_register(),
            Token::Gate => self.parse_gate_def(),
            Token::Opaque => self.parse_opaque(),
            Token::If => self.parse_if(),
            Token::Measure | Token::Reset | Token::Barrier | Token::Ident(_) => {
                Ok(Statement::Op(self.parse_operation()?))
            }
            other => {
                self.pos += 1;
                Err(self.unexpected("statement", &other))
            }
        }
    }

    fn parse_include(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Include)?;
        let path = match self.advance() {
            Some(Token::Str(s)) => s,
            Some(other) => return Err(self.unexpected("string literal", &other)),
            None => return Err(ParseError::UnexpectedEof("include path".into())),
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Include(path))
    }

    fn parse_register(&mut self) -> ParseResult<Statement> {
        let quantum = matches!(self.advance(), Some(Token::QReg));
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = self.parse_index()?;
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;
        Ok(if quantum {
            Statement::QReg { name, size }
        } else {
            Statement::CReg { name, size }
        })
    }

    /// Parse `name(params) qubits` shared by `gate` and `opaque`.
    fn parse_gate_signature(&mut self) -> ParseResult<(String, Vec<String>, Vec<String>)> {
        let name = self.parse_identifier()?;
        let params = if self.consume(&Token::LParen) {
            let params = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.parse_identifier_list()?
            };
            self.expect(Token::RParen)?;
            params
        } else {
            vec![]
        };
        let qubits = self.parse_identifier_list()?;
        Ok((name, params, qubits))
    }

    fn parse_gate_def(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Gate)?;
        let (name, params, qubits) = self.parse_gate_signature()?;
        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        while !self.consume(&Token::RBrace) {
            if self.is_eof() {
                return Err(ParseError::UnexpectedEof(format!("'}}' closing gate {name}")));
            }
            body.push(self.parse_operation()?);
        }
        Ok(Statement::GateDef(GateDef {
            name,
            params,
            qubits,
            body,
        }))
    }

    fn parse_opaque(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Opaque)?;
        let (name, params, qubits) = self.parse_gate_signature()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Opaque {
            name,
            params,
            qubits,
        })
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let register = self.parse_identifier()?;
        self.expect(Token::EqEq)?;
        let value = self.parse_integer()?;
        self.expect(Token::RParen)?;
        let op = self.parse_operation()?;
        Ok(Statement::If {
            register,
            value,
            op,
        })
    }

    fn parse_operation(&mut self) -> ParseResult<Operation> {
        let op = match self.advance() {
            Some(Token::Measure) => {
                let qubit = self.parse_argument()?;
                self.expect(Token::Arrow)?;
                let bit = self.parse_argument()?;
                Operation::Measure { qubit, bit }
            }
            Some(Token::Reset) => Operation::Reset(self.parse_argument()?),
            Some(Token::Barrier) => Operation::Barrier(self.parse_argument_list()?),
            Some(Token::Ident(name)) => {
                let params = if self.consume(&Token::LParen) {
                    let params = self.parse_expression_list()?;
                    self.expect(Token::RParen)?;
                    params
                } else {
                    vec![]
                };
                let args = self.parse_argument_list()?;
                Operation::Gate(GateCall { name, params, args })
            }
            Some(other) => return Err(self.unexpected("quantum operation", &other)),
            None => return Err(ParseError::UnexpectedEof("quantum operation".into())),
        };
        self.expect(Token::Semicolon)?;
        Ok(op)
    }

    fn parse_argument(&mut self) -> ParseResult<Argument> {
        let name = self.parse_identifier()?;
        if self.consume(&Token::LBracket) {
            let index = self.parse_index()?;
            self.expect(Token::RBracket)?;
            Ok(Argument::element(name, index))
        } else {
            Ok(Argument::whole(name))
        }
    }

    fn parse_argument_list(&mut self) -> ParseResult<Vec<Argument>> {
        let mut args = vec![self.parse_argument()?];
        while self.consume(&Token::Comma) {
            args.push(self.parse_argument()?);
        }
        Ok(args)
    }
}
