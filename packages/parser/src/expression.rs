//! Restricted JavaScript expression grammar.
//!
//! Covers what markup attributes use in practice: literals, object and array
//! literals, identifiers, member paths, calls, and zero-argument arrow
//! functions. Nothing here is ever executed; the tree is handed to the
//! interpreter, which only resolves allow-listed names.

use crate::error::{ParseError, ParseResult};
use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
enum ExprToken<'src> {
    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    #[token("undefined")]
    Undefined,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\]|\\.)*'", |lex| lex.slice())]
    String(&'src str),

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("?.")]
    OptionalDot,

    #[token("-")]
    Minus,

    #[token("=>")]
    Arrow,
}

/// Parsed expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Expr {
    Null,
    Bool { value: bool },
    Number { value: f64 },
    String { value: String },
    Ident { name: String },
    Member { object: Box<Expr>, property: String },
    Array { items: Vec<Expr> },
    Object { entries: Vec<(String, Expr)> },
    Call { callee: Box<Expr>, arguments: Vec<Expr> },
    Arrow { params: Vec<String>, body: Box<Expr> },
}

impl Expr {
    pub fn string(value: impl Into<String>) -> Self {
        Expr::String {
            value: value.into(),
        }
    }

    pub fn number(value: f64) -> Self {
        Expr::Number { value }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident { name: name.into() }
    }

    /// Root identifier of an identifier or member path (`motion` in `motion.div`)
    pub fn root_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident { name } => Some(name),
            Expr::Member { object, .. } => object.root_ident(),
            Expr::Call { callee, .. } => callee.root_ident(),
            _ => None,
        }
    }

    /// Every free identifier the expression references, in source order
    pub fn identifiers(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_identifiers(&[], &mut out);
        out
    }

    fn collect_identifiers<'a>(&'a self, bound: &[&str], out: &mut Vec<&'a str>) {
        match self {
            Expr::Ident { name } => {
                if !bound.contains(&name.as_str()) && !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Expr::Member { object, .. } => object.collect_identifiers(bound, out),
            Expr::Array { items } => {
                for item in items {
                    item.collect_identifiers(bound, out);
                }
            }
            Expr::Object { entries } => {
                for (_, value) in entries {
                    value.collect_identifiers(bound, out);
                }
            }
            Expr::Call { callee, arguments } => {
                callee.collect_identifiers(bound, out);
                for arg in arguments {
                    arg.collect_identifiers(bound, out);
                }
            }
            Expr::Arrow { params, body } => {
                let mut inner: Vec<&str> = bound.to_vec();
                inner.extend(params.iter().map(String::as_str));
                body.collect_identifiers(&inner, out);
            }
            Expr::Null | Expr::Bool { .. } | Expr::Number { .. } | Expr::String { .. } => {}
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Null => write!(f, "null"),
            Expr::Bool { value } => write!(f, "{}", value),
            Expr::Number { value } => write!(f, "{}", format_number(*value)),
            Expr::String { value } => write!(f, "\"{}\"", escape_string(value)),
            Expr::Ident { name } => write!(f, "{}", name),
            Expr::Member { object, property } => write!(f, "{}.{}", object, property),
            Expr::Array { items } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Expr::Object { entries } => {
                if entries.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", format_key(key), value)?;
                }
                write!(f, " }}")
            }
            Expr::Call { callee, arguments } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Arrow { params, body } => write!(f, "({}) => {}", params.join(", "), body),
        }
    }
}

/// Render a number the way JavaScript prints it (`1`, not `1.0`)
pub fn format_number(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn escape_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn format_key(key: &str) -> String {
    let is_ident = key
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        .unwrap_or(false)
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_ident {
        key.to_string()
    } else {
        format!("\"{}\"", escape_string(key))
    }
}

/// Strip the quotes from a string literal and resolve escapes
pub fn unquote(literal: &str) -> String {
    let inner = if literal.len() >= 2 {
        &literal[1..literal.len() - 1]
    } else {
        literal
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

struct ExprParser<'src> {
    tokens: Vec<(ExprToken<'src>, Range<usize>)>,
    pos: usize,
}

/// Parse a standalone expression
pub fn parse_expression(source: &str) -> ParseResult<Expr> {
    let mut tokens = Vec::new();
    let mut lex = ExprToken::lexer(source);
    while let Some(result) = lex.next() {
        match result {
            Ok(token) => tokens.push((token, lex.span())),
            Err(()) => {
                return Err(ParseError::lex_error(
                    lex.span(),
                    format!("Unsupported expression syntax '{}'", lex.slice()),
                ))
            }
        }
    }

    let mut parser = ExprParser { tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    if let Some((token, span)) = parser.peek() {
        return Err(ParseError::unexpected_token(
            span.clone(),
            "end of expression",
            format!("{:?}", token),
        ));
    }
    Ok(expr)
}

impl<'src> ExprParser<'src> {
    fn parse_expr(&mut self) -> ParseResult<Expr> {
        if self.at_arrow() {
            return self.parse_arrow();
        }
        self.parse_postfix()
    }

    /// `(a, b) => body` or `x => body`
    fn at_arrow(&self) -> bool {
        match self.peek() {
            Some((ExprToken::Ident(_), _)) => {
                matches!(self.peek_ahead(1), Some((ExprToken::Arrow, _)))
            }
            Some((ExprToken::LParen, _)) => {
                let mut i = self.pos + 1;
                while let Some((token, _)) = self.tokens.get(i) {
                    match token {
                        ExprToken::Ident(_) | ExprToken::Comma => i += 1,
                        ExprToken::RParen => {
                            return matches!(self.tokens.get(i + 1), Some((ExprToken::Arrow, _)))
                        }
                        _ => return false,
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn parse_arrow(&mut self) -> ParseResult<Expr> {
        let mut params = Vec::new();
        if self.match_token(&ExprToken::LParen) {
            while !self.check(&ExprToken::RParen) {
                params.push(self.expect_ident()?);
                if !self.match_token(&ExprToken::Comma) {
                    break;
                }
            }
            self.expect(&ExprToken::RParen, "')'")?;
        } else {
            params.push(self.expect_ident()?);
        }
        self.expect(&ExprToken::Arrow, "'=>'")?;
        let body = self.parse_expr()?;
        Ok(Expr::Arrow {
            params,
            body: Box::new(body),
        })
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.match_token(&ExprToken::Dot) || self.match_token(&ExprToken::OptionalDot) {
                let property = self.expect_ident()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.match_token(&ExprToken::LParen) {
                let mut arguments = Vec::new();
                while !self.check(&ExprToken::RParen) {
                    arguments.push(self.parse_expr()?);
                    if !self.match_token(&ExprToken::Comma) {
                        break;
                    }
                }
                self.expect(&ExprToken::RParen, "')'")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    arguments,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some((token, span)) = self.advance() else {
            return Err(ParseError::unexpected_eof("expression"));
        };

        match token {
            ExprToken::True => Ok(Expr::Bool { value: true }),
            ExprToken::False => Ok(Expr::Bool { value: false }),
            ExprToken::Null | ExprToken::Undefined => Ok(Expr::Null),
            ExprToken::Number(value) => Ok(Expr::number(value)),
            ExprToken::String(literal) => Ok(Expr::string(unquote(literal))),
            ExprToken::Ident(name) => Ok(Expr::ident(name)),
            ExprToken::Minus => match self.parse_primary()? {
                Expr::Number { value } => Ok(Expr::number(-value)),
                _ => Err(ParseError::invalid_syntax(
                    span,
                    "Unary minus is only supported on numbers",
                )),
            },
            ExprToken::LParen => {
                let inner = self.parse_expr()?;
                self.expect(&ExprToken::RParen, "')'")?;
                Ok(inner)
            }
            ExprToken::LBracket => {
                let mut items = Vec::new();
                while !self.check(&ExprToken::RBracket) {
                    items.push(self.parse_expr()?);
                    if !self.match_token(&ExprToken::Comma) {
                        break;
                    }
                }
                self.expect(&ExprToken::RBracket, "']'")?;
                Ok(Expr::Array { items })
            }
            ExprToken::LBrace => {
                let mut entries = Vec::new();
                while !self.check(&ExprToken::RBrace) {
                    let key = match self.advance() {
                        Some((ExprToken::Ident(name), _)) => name.to_string(),
                        Some((ExprToken::String(literal), _)) => unquote(literal),
                        Some((ExprToken::Number(n), _)) => format_number(n),
                        Some((ExprToken::True, _)) => "true".to_string(),
                        Some((ExprToken::False, _)) => "false".to_string(),
                        Some((ExprToken::Null, _)) => "null".to_string(),
                        Some((other, span)) => {
                            return Err(ParseError::unexpected_token(
                                span,
                                "object key",
                                format!("{:?}", other),
                            ))
                        }
                        None => return Err(ParseError::unexpected_eof("object key")),
                    };
                    let value = if self.match_token(&ExprToken::Colon) {
                        self.parse_expr()?
                    } else {
                        // shorthand `{ x }`
                        Expr::ident(key.clone())
                    };
                    entries.push((key, value));
                    if !self.match_token(&ExprToken::Comma) {
                        break;
                    }
                }
                self.expect(&ExprToken::RBrace, "'}'")?;
                Ok(Expr::Object { entries })
            }
            other => Err(ParseError::unexpected_token(
                span,
                "expression",
                format!("{:?}", other),
            )),
        }
    }

    // Helper methods

    fn peek(&self) -> Option<&(ExprToken<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn peek_ahead(&self, offset: usize) -> Option<&(ExprToken<'src>, Range<usize>)> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<(ExprToken<'src>, Range<usize>)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn check(&self, token: &ExprToken) -> bool {
        self.peek()
            .map(|(t, _)| std::mem::discriminant(t) == std::mem::discriminant(token))
            .unwrap_or(false)
    }

    fn match_token(&mut self, token: &ExprToken) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &ExprToken, expected: &str) -> ParseResult<()> {
        if self.match_token(token) {
            return Ok(());
        }
        match self.peek() {
            Some((found, span)) => Err(ParseError::unexpected_token(
                span.clone(),
                expected,
                format!("{:?}", found),
            )),
            None => Err(ParseError::unexpected_eof(expected)),
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((ExprToken::Ident(name), _)) => {
                let name = name.to_string();
                self.pos += 1;
                Ok(name)
            }
            Some((found, span)) => Err(ParseError::unexpected_token(
                span.clone(),
                "identifier",
                format!("{:?}", found),
            )),
            None => Err(ParseError::unexpected_eof("identifier")),
        }
    }
}
