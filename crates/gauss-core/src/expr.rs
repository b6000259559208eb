//! Row transformation language.
//!
//! A transformation reassigns one row to a linear combination of rows:
//!
//! ```text
//! assignment := ROWREF "=" expr
//! expr       := term (("+" | "-") term)*
//! term       := factor (("*" | "/") factor)*
//! factor     := ROWREF | NUMBER | "(" expr ")" | "-" factor
//! ROWREF     := "R" INTEGER
//! NUMBER     := decimal literal, optionally signed
//! ```
//!
//! Row names are 1-based and case-insensitive (`R1`, `r1`). Parsing is purely
//! syntactic plus row range validation; nothing is evaluated here.

use crate::canonical::format_number;
use crate::error::{EngineError, EngineResult};

/// A token produced by the lexer
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the source text
    pub offset: usize,
}

/// Token types
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// `R<k>`, holding the 1-based index as written
    Row(usize),
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    OpenParen,
    CloseParen,
    Equals,
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Row(k) => write!(f, "R{}", k),
            Self::Number(n) => write!(f, "{}", n),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::Equals => write!(f, "="),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// Lexer for transformation text
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> EngineResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            if self.pos >= self.input.len() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    offset: self.pos,
                });
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> EngineResult<Token> {
        let offset = self.pos;
        let ch = self.input[self.pos];

        let kind = match ch {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'(' => TokenKind::OpenParen,
            b')' => TokenKind::CloseParen,
            b'=' => TokenKind::Equals,
            b'r' | b'R' => return self.read_row(),
            c if c.is_ascii_digit() || c == b'.' => return self.read_number(),
            _ => {
                let found = self.char_at(offset);
                return Err(EngineError::parse(format!(
                    "Unexpected character '{}' at position {}",
                    found,
                    offset + 1
                )));
            }
        };

        self.pos += 1;
        Ok(Token { kind, offset })
    }

    fn read_row(&mut self) -> EngineResult<Token> {
        let offset = self.pos;
        self.pos += 1; // skip 'R'

        let start = self.pos;
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            self.pos += 1;
        }

        if start == self.pos {
            return Err(EngineError::parse(format!(
                "Expected a row number after 'R' at position {}",
                offset + 1
            )));
        }

        let digits = self.slice(start, self.pos);
        // Too many digits to fit is simply a row that does not exist.
        let index = digits.parse::<usize>().unwrap_or(usize::MAX);
        Ok(Token {
            kind: TokenKind::Row(index),
            offset,
        })
    }

    fn read_number(&mut self) -> EngineResult<Token> {
        let offset = self.pos;
        let mut seen_dot = false;
        let mut seen_digit = false;

        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b'0'..=b'9' => seen_digit = true,
                b'.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            self.pos += 1;
        }

        let text = self.slice(offset, self.pos);
        if !seen_digit {
            return Err(EngineError::parse(format!(
                "Invalid number '{}' at position {}",
                text,
                offset + 1
            )));
        }

        let value = text.parse::<f64>().map_err(|_| {
            EngineError::parse(format!("Invalid number '{}' at position {}", text, offset + 1))
        })?;
        Ok(Token {
            kind: TokenKind::Number(value),
            offset,
        })
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        // only ASCII bytes are consumed by the scanning loops
        std::str::from_utf8(&self.input[start..end]).unwrap_or_default()
    }

    fn char_at(&self, offset: usize) -> char {
        std::str::from_utf8(&self.input[offset..])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or('?')
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Subtract => 1,
            BinaryOp::Multiply | BinaryOp::Divide => 2,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }
}

/// Expression tree over row references and numeric literals
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// 0-based row index, already range checked
    Row(usize),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Negate(Box<Expr>),
}

impl Expr {
    /// Highest 0-based row index referenced anywhere in the tree.
    pub fn highest_row(&self) -> Option<usize> {
        match self {
            Expr::Number(_) => None,
            Expr::Row(i) => Some(*i),
            Expr::Binary { left, right, .. } => left.highest_row().max(right.highest_row()),
            Expr::Negate(inner) => inner.highest_row(),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Negate(_) => 3,
            Expr::Number(_) | Expr::Row(_) => 4,
        }
    }

    fn fmt_child(&self, f: &mut std::fmt::Formatter<'_>, min: u8) -> std::fmt::Result {
        if self.precedence() < min {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) if *n < 0.0 => write!(f, "({})", format_number(*n)),
            Expr::Number(n) => write!(f, "{}", format_number(*n)),
            Expr::Row(i) => write!(f, "R{}", i + 1),
            Expr::Binary { op, left, right } => {
                let p = op.precedence();
                left.fmt_child(f, p)?;
                write!(f, " {} ", op.symbol())?;
                // right operand binds tighter: a - (b - c) keeps its parens
                right.fmt_child(f, p + 1)
            }
            Expr::Negate(inner) => {
                write!(f, "-")?;
                inner.fmt_child(f, 3)
            }
        }
    }
}

/// A parsed, immutable row assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    /// 0-based target row
    pub target: usize,
    pub expr: Expr,
}

impl Transformation {
    /// Parse `text` for a matrix with `size` rows.
    pub fn parse(text: &str, size: usize) -> EngineResult<Self> {
        Parser::parse(text, size)
    }
}

impl std::fmt::Display for Transformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{} = {}", self.target + 1, self.expr)
    }
}

/// Parse a transformation; see [`Transformation::parse`].
pub fn parse(text: &str, size: usize) -> EngineResult<Transformation> {
    Parser::parse(text, size)
}

/// Recursive descent parser
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    size: usize,
}

impl Parser {
    fn parse(text: &str, size: usize) -> EngineResult<Transformation> {
        let equals = text.matches('=').count();
        if equals != 1 {
            return Err(EngineError::parse(if equals == 0 {
                "Missing '=': expected an assignment like 'R1 = R1 * 2'".to_string()
            } else {
                "Expected exactly one '=' in the transformation".to_string()
            }));
        }

        let tokens = Lexer::new(text).tokenize()?;
        let mut parser = Self {
            tokens,
            pos: 0,
            size,
        };
        parser.parse_assignment()
    }

    fn parse_assignment(&mut self) -> EngineResult<Transformation> {
        let target = match self.peek_kind() {
            TokenKind::Row(k) => {
                self.advance();
                self.row_index(k)?
            }
            _ => {
                return Err(EngineError::parse(
                    "Left side must be a single row reference such as 'R1'",
                ))
            }
        };

        if !self.check(&TokenKind::Equals) {
            return Err(EngineError::parse(
                "Left side must be a single row reference such as 'R1'",
            ));
        }
        self.advance();

        if self.check(&TokenKind::Eof) {
            return Err(EngineError::parse("Missing expression after '='"));
        }

        let expr = self.parse_expr()?;

        if !self.check(&TokenKind::Eof) {
            let tok = self.peek();
            return Err(EngineError::parse(format!(
                "Unexpected '{}' at position {}",
                tok.kind,
                tok.offset + 1
            )));
        }

        Ok(Transformation { target, expr })
    }

    fn parse_expr(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> EngineResult<Expr> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> EngineResult<Expr> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Row(k) => {
                self.advance();
                Ok(Expr::Row(self.row_index(k)?))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            TokenKind::Minus => {
                self.advance();
                let inner = self.parse_factor()?;
                Ok(Expr::Negate(Box::new(inner)))
            }
            // explicit sign on a literal, e.g. "R1 * +2"
            TokenKind::Plus => {
                self.advance();
                match self.peek_kind() {
                    TokenKind::Number(n) => {
                        self.advance();
                        Ok(Expr::Number(n))
                    }
                    _ => Err(EngineError::parse(format!(
                        "Unary '+' must be followed by a number at position {}",
                        tok.offset + 1
                    ))),
                }
            }
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.parse_expr()?;
                if !self.check(&TokenKind::CloseParen) {
                    let found = self.peek();
                    return Err(EngineError::parse(format!(
                        "Expected ')' but found '{}' at position {}",
                        found.kind,
                        found.offset + 1
                    )));
                }
                self.advance();
                Ok(inner)
            }
            TokenKind::Eof => Err(EngineError::parse("Unexpected end of expression")),
            other => Err(EngineError::parse(format!(
                "Unexpected '{}' at position {}",
                other,
                tok.offset + 1
            ))),
        }
    }

    /// Convert a written 1-based row number to an index, enforcing range.
    fn row_index(&self, written: usize) -> EngineResult<usize> {
        if written == 0 || written > self.size {
            return Err(EngineError::Range {
                index: written,
                size: self.size,
            });
        }
        Ok(written - 1)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind.clone()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn row(i: usize) -> Box<Expr> {
        Box::new(Expr::Row(i))
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Number(n))
    }

    #[test]
    fn test_parse_scale() {
        let t = parse("R1 = R1 * 2", 3).unwrap();
        assert_eq!(t.target, 0);
        assert_eq!(
            t.expr,
            Expr::Binary {
                op: BinaryOp::Multiply,
                left: row(0),
                right: num(2.0),
            }
        );
    }

    #[test]
    fn test_precedence_and_associativity() {
        let t = parse("R2 = 5*R1 + R2", 3).unwrap();
        assert_eq!(t.target, 1);
        assert_eq!(
            t.expr,
            Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(Expr::Binary {
                    op: BinaryOp::Multiply,
                    left: num(5.0),
                    right: row(0),
                }),
                right: row(1),
            }
        );

        let t = parse("R3 = R3 - R1 - R2", 3).unwrap();
        assert_eq!(t.to_string(), "R3 = R3 - R1 - R2");
        match t.expr {
            Expr::Binary { op, left, .. } => {
                assert_eq!(op, BinaryOp::Subtract);
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Subtract, .. }));
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_case_insensitive_and_whitespace() {
        let a = parse("r1 = r1 / 4", 3).unwrap();
        let b = parse("R1=R1/4", 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unary_minus_and_parens() {
        let t = parse("R3 = -(R3 - 2 * R1)", 3).unwrap();
        assert!(matches!(t.expr, Expr::Negate(_)));
        assert_eq!(t.to_string(), "R3 = -(R3 - 2 * R1)");

        let t = parse("R1 = R1 * -0.5", 3).unwrap();
        assert_eq!(t.to_string(), "R1 = R1 * -0.5");
    }

    #[test]
    fn test_decimal_literals() {
        let t = parse("R1 = R1 * .25", 3).unwrap();
        assert_eq!(
            t.expr,
            Expr::Binary {
                op: BinaryOp::Multiply,
                left: row(0),
                right: num(0.25),
            }
        );
        assert!(parse("R1 = R1 * +2", 3).is_ok());
        assert_eq!(parse("R1 = R1 * .", 3).unwrap_err().kind(), ErrorKind::ParseError);
        assert_eq!(parse("R1 = R1 * 1.2.3", 3).unwrap_err().kind(), ErrorKind::ParseError);
    }

    #[test]
    fn test_missing_or_repeated_equals() {
        assert_eq!(parse("R1 * 2", 3).unwrap_err().kind(), ErrorKind::ParseError);
        assert_eq!(parse("R1 = R2 = R3", 3).unwrap_err().kind(), ErrorKind::ParseError);
    }

    #[test]
    fn test_left_side_must_be_bare_row() {
        for text in ["2 = R1", "R1 + R2 = R1", "(R1) = R2", "= R1", "x = R1"] {
            let err = parse(text, 3).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ParseError, "{}", text);
        }
    }

    #[test]
    fn test_malformed_right_side() {
        for text in [
            "R1 = R1 * abc",
            "R1 =",
            "R1 = (R1 + R2",
            "R1 = R1 + ",
            "R1 = R1 R2",
            "R1 = R1 * 2)",
            "R1 = R",
            "R1 = +R2",
            "R1 = R1 ** 2",
        ] {
            let err = parse(text, 3).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ParseError, "{}", text);
        }
    }

    #[test]
    fn test_row_out_of_range() {
        let err = parse("R9 = R1 * 2", 3).unwrap_err();
        assert_eq!(err, EngineError::Range { index: 9, size: 3 });

        assert_eq!(parse("R1 = R0 + R1", 3).unwrap_err().kind(), ErrorKind::RangeError);
        assert_eq!(parse("R1 = R4", 3).unwrap_err().kind(), ErrorKind::RangeError);
        assert_eq!(
            parse("R1 = R99999999999999999999999", 3).unwrap_err().kind(),
            ErrorKind::RangeError
        );
        // the same text is fine on a larger system
        assert!(parse("R4 = R4 - R1", 4).is_ok());
    }

    #[test]
    fn test_highest_row() {
        assert_eq!(parse("R1 = R3 - 2 * R2", 3).unwrap().expr.highest_row(), Some(2));
        assert_eq!(parse("R1 = 4", 3).unwrap().expr.highest_row(), None);
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        for text in [
            "R1 = R1 * 0.5",
            "R2 = R2 - 3 * R1",
            "R3 = (R1 + R2) / 2",
            "R1 = R1 - (R2 - R3)",
            "R2 = -R2",
        ] {
            let t = parse(text, 3).unwrap();
            assert_eq!(t.to_string(), text);
            assert_eq!(parse(&t.to_string(), 3).unwrap(), t);
        }
    }
}
