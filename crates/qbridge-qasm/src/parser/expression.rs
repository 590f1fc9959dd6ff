//! Expression parsing.
//!
//! Precedence, loosest first: `+ -`, `* /`, unary `-`, `^` (right associative).

use super::Parser;
use crate::ast::{BinOp, Expression};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser<'_> {
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_term()?;
            left = binary(left, op, right);
        }
    }

    fn parse_term(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        if self.consume(&Token::Minus) {
            return Ok(Expression::Neg(Box::new(self.parse_unary()?)));
        }
        if self.consume(&Token::Plus) {
            return self.parse_unary();
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> ParseResult<Expression> {
        let base = self.parse_primary()?;
        if self.consume(&Token::Caret) {
            let exponent = self.parse_unary()?;
            return Ok(binary(base, BinOp::Pow, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expression".into()))?;
        match token {
            Token::Integer(v) => Ok(Expression::Int(v)),
            Token::Real(v) => Ok(Expression::Real(v)),
            Token::Pi => Ok(Expression::Pi),
            Token::Ident(name) => {
                if self.consume(&Token::LParen) {
                    let arg = self.parse_expression()?;
                    self.expect(Token::RParen)?;
                    Ok(Expression::Call {
                        func: name,
                        arg: Box::new(arg),
                    })
                } else {
                    Ok(Expression::Ident(name))
                }
            }
            Token::LParen => {
                let inner = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(self.unexpected("expression", &other)),
        }
    }

    /// Comma-separated expressions; the caller consumes the parentheses.
    pub(super) fn parse_expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }
}

fn binary(left: Expression, op: BinOp, right: Expression) -> Expression {
    Expression::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}
