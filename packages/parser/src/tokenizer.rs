//! Markup tokenizer.
//!
//! JSX needs two lexical modes: inside a tag (`<div className="a">`) whitespace
//! separates attributes, while between tags everything up to the next `<` or
//! `{` is literal text. Each mode has its own logos lexer and the driver loop
//! switches between them. `{...}` expressions are scanned by hand because their
//! braces nest.

use crate::error::{ParseError, ParseResult};
use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum TagLexeme<'src> {
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$.:-]*", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\]|\\.)*'", |lex| lex.slice())]
    String(&'src str),

    #[token("=")]
    Equals,

    #[token("/>")]
    SelfClose,

    #[token(">")]
    TagEnd,

    #[token("{")]
    LBrace,
}

#[derive(Logos, Debug, Clone, PartialEq)]
enum ContentLexeme<'src> {
    #[token("</")]
    CloseTagOpen,

    #[token("<")]
    OpenTag,

    #[token("{")]
    LBrace,

    #[regex(r"[^<{]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Markup token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    /// `<`
    OpenTag,
    /// `</`
    CloseTagOpen,
    /// `>`
    TagEnd,
    /// `/>`
    SelfClose,
    /// `=`
    Equals,
    /// Tag or attribute name, possibly dotted (`motion.div`)
    Ident(&'src str),
    /// Quoted attribute value, quotes included
    String(&'src str),
    /// Contents of a `{...}` expression, outer braces excluded
    Expression(&'src str),
    /// Literal text between tags
    Text(&'src str),
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::OpenTag => write!(f, "'<'"),
            Token::CloseTagOpen => write!(f, "'</'"),
            Token::TagEnd => write!(f, "'>'"),
            Token::SelfClose => write!(f, "'/>'"),
            Token::Equals => write!(f, "'='"),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::String(s) => write!(f, "string {}", s),
            Token::Expression(s) => write!(f, "expression {{{}}}", s),
            Token::Text(s) => write!(f, "text '{}'", s.trim()),
        }
    }
}

pub type SpannedToken<'src> = (Token<'src>, Range<usize>);

/// Tokens of one root markup expression
#[derive(Debug, Clone)]
pub struct TokenStream<'src> {
    pub tokens: Vec<SpannedToken<'src>>,
    /// Byte offset just past the root element's closing `>`
    pub end: usize,
}

#[derive(Clone, Copy)]
enum Mode {
    Content,
    Tag { closing: bool },
}

/// Tokenize the markup element starting at `start` (which must point at `<`).
/// Stops as soon as that element is closed; anything after it is left alone.
pub fn tokenize(source: &str, start: usize) -> ParseResult<TokenStream<'_>> {
    let mut tokens = Vec::new();
    let mut pos = start;
    let mut depth: usize = 0;
    let mut mode = Mode::Content;

    'outer: while pos < source.len() {
        match mode {
            Mode::Content => {
                let mut lex = ContentLexeme::lexer(&source[pos..]);
                while let Some(result) = lex.next() {
                    let span = pos + lex.span().start..pos + lex.span().end;
                    match result {
                        Ok(ContentLexeme::Text(text)) => {
                            tokens.push((Token::Text(text), span));
                        }
                        Ok(ContentLexeme::OpenTag) => {
                            tokens.push((Token::OpenTag, span.clone()));
                            depth += 1;
                            pos = span.end;
                            mode = Mode::Tag { closing: false };
                            continue 'outer;
                        }
                        Ok(ContentLexeme::CloseTagOpen) => {
                            tokens.push((Token::CloseTagOpen, span.clone()));
                            pos = span.end;
                            mode = Mode::Tag { closing: true };
                            continue 'outer;
                        }
                        Ok(ContentLexeme::LBrace) => {
                            let end = scan_expression(source, span.start)?;
                            tokens.push((
                                Token::Expression(&source[span.start + 1..end - 1]),
                                span.start..end,
                            ));
                            pos = end;
                            continue 'outer;
                        }
                        Err(()) => {
                            return Err(ParseError::lex_error(span, "Unrecognized character"));
                        }
                    }
                }
                break;
            }
            Mode::Tag { closing } => {
                let mut lex = TagLexeme::lexer(&source[pos..]);
                while let Some(result) = lex.next() {
                    let span = pos + lex.span().start..pos + lex.span().end;
                    match result {
                        Ok(TagLexeme::Ident(name)) => tokens.push((Token::Ident(name), span)),
                        Ok(TagLexeme::String(value)) => tokens.push((Token::String(value), span)),
                        Ok(TagLexeme::Equals) => tokens.push((Token::Equals, span)),
                        Ok(TagLexeme::LBrace) => {
                            let end = scan_expression(source, span.start)?;
                            tokens.push((
                                Token::Expression(&source[span.start + 1..end - 1]),
                                span.start..end,
                            ));
                            pos = end;
                            continue 'outer;
                        }
                        Ok(TagLexeme::TagEnd) => {
                            tokens.push((Token::TagEnd, span.clone()));
                            pos = span.end;
                            if closing {
                                depth = depth.saturating_sub(1);
                                if depth == 0 {
                                    return Ok(TokenStream { tokens, end: pos });
                                }
                            }
                            mode = Mode::Content;
                            continue 'outer;
                        }
                        Ok(TagLexeme::SelfClose) => {
                            tokens.push((Token::SelfClose, span.clone()));
                            pos = span.end;
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                return Ok(TokenStream { tokens, end: pos });
                            }
                            mode = Mode::Content;
                            continue 'outer;
                        }
                        Err(()) => {
                            return Err(ParseError::lex_error(
                                span,
                                format!("Unexpected '{}' inside tag", lex.slice()),
                            ));
                        }
                    }
                }
                break;
            }
        }
    }

    Err(ParseError::unexpected_eof(if depth > 0 {
        "closing tag"
    } else {
        "markup element"
    }))
}

/// Scan a brace-balanced expression starting at the `{` at `open`.
/// Returns the offset just past the matching `}`.
pub fn scan_expression(source: &str, open: usize) -> ParseResult<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i + 1);
                }
            }
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    Err(ParseError::unexpected_eof("'}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source, 0)
            .unwrap()
            .tokens
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_self_closing() {
        assert_eq!(
            kinds(r#"<img src="a.png" />"#),
            vec![
                Token::OpenTag,
                Token::Ident("img"),
                Token::Ident("src"),
                Token::Equals,
                Token::String("\"a.png\""),
                Token::SelfClose,
            ]
        );
    }

    #[test]
    fn test_nested_with_text() {
        let tokens = kinds("<div><h1>Hello</h1></div>");
        assert_eq!(tokens.len(), 13);
        assert!(tokens.contains(&Token::Text("Hello")));
    }

    #[test]
    fn test_stops_after_root() {
        let source = "<p>hi</p>);\n}";
        let stream = tokenize(source, 0).unwrap();
        assert_eq!(&source[stream.end..], ");\n}");
    }

    #[test]
    fn test_nested_braces_in_expression() {
        let tokens = kinds("<div style={{ color: 'red', margin: '0 {x}' }} />");
        assert!(tokens.contains(&Token::Expression("{ color: 'red', margin: '0 {x}' }")));
    }

    #[test]
    fn test_unclosed_is_eof_error() {
        let err = tokenize("<div><span>", 0).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_fragment() {
        let tokens = kinds("<><b>x</b></>");
        assert_eq!(tokens.first(), Some(&Token::OpenTag));
        assert_eq!(tokens.get(1), Some(&Token::TagEnd));
    }
}
