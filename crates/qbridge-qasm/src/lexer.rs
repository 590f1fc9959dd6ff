//! Lexer for `OpenQASM` 2.0.

use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // Keywords
    #[token("OPENQASM")]
    OpenQasm,
    #[token("include")]
    Include,
    #[token("qreg")]
    QReg,
    #[token("creg")]
    CReg,
    #[token("gate")]
    Gate,
    #[token("opaque")]
    Opaque,
    #[token("measure")]
    Measure,
    #[token("reset")]
    Reset,
    #[token("barrier")]
    Barrier,
    #[token("if")]
    If,
    #[token("pi")]
    Pi,

    // Literals
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Real(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    Integer(u64),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len() - 1].to_string())
    })]
    Str(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Operators and punctuation
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("==")]
    EqEq,
    #[token("->")]
    Arrow,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Real(v) => return write!(f, "{v}"),
            Token::Integer(v) => return write!(f, "{v}"),
            Token::Str(s) => return write!(f, "\"{s}\""),
            Token::Ident(s) => return write!(f, "{s}"),
            Token::OpenQasm => "OPENQASM",
            Token::Include => "include",
            Token::QReg => "qreg",
            Token::CReg => "creg",
            Token::Gate => "gate",
            Token::Opaque => "opaque",
            Token::Measure => "measure",
            Token::Reset => "reset",
            Token::Barrier => "barrier",
            Token::If => "if",
            Token::Pi => "pi",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Caret => "^",
            Token::EqEq => "==",
            Token::Arrow => "->",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Semicolon => ";",
            Token::Comma => ",",
        };
        f.write_str(text)
    }
}

/// A token with its byte span in the source.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Range<usize>,
}

/// Tokenize a QASM 2 source string.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken, (Range<usize>, String)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => tokens.push(Ok(SpannedToken { token, span })),
            Err(()) => {
                let slice = &source[span.clone()];
                tokens.push(Err((span, format!("Invalid token: '{slice}'"))));
            }
        }
    }

    tokens
}

/// 1-based line number of a byte offset.
pub fn line_of(source: &str, offset: usize) -> usize {
    source
        .get(..offset)
        .map_or(1, |head| head.bytes().filter(|&b| b == b'\n').count() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        tokenize(source)
            .into_iter()
            .filter_map(Result::ok)
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_header() {
        let tokens = lex("OPENQASM 2.0;");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], Token::OpenQasm);
        assert!(matches!(tokens[1], Token::Real(v) if (v - 2.0).abs() < 1e-12));
        assert_eq!(tokens[2], Token::Semicolon);
    }

    #[test]
    fn test_register_and_measure() {
        assert_eq!(
            lex("qreg q[4]; measure q -> c;"),
            vec![
                Token::QReg,
                Token::Ident("q".into()),
                Token::LBracket,
                Token::Integer(4),
                Token::RBracket,
                Token::Semicolon,
                Token::Measure,
                Token::Ident("q".into()),
                Token::Arrow,
                Token::Ident("c".into()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_expression_tokens() {
        let tokens = lex("u2(-pi/2, .5e1^2) q[0];");
        assert_eq!(tokens[2], Token::Minus);
        assert_eq!(tokens[3], Token::Pi);
        assert_eq!(tokens[6], Token::Comma);
        assert!(matches!(tokens[7], Token::Real(v) if (v - 5.0).abs() < 1e-12));
        assert_eq!(tokens[8], Token::Caret);
    }

    #[test]
    fn test_comments_and_invalid() {
        let results = tokenize("// header\nqreg q[1]; $");
        let ok = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok, 6);
        assert!(results.last().is_some_and(Result::is_err));
    }

    #[test]
    fn test_line_of() {
        let src = "a\nb\nc";
        assert_eq!(line_of(src, 0), 1);
        assert_eq!(line_of(src, 2), 2);
        assert_eq!(line_of(src, 4), 3);
    }
}
