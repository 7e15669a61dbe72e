//! Error types for the markup parser

use std::ops::Range;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with location and context
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {span:?}: expected {expected}, found {found}")]
    UnexpectedToken {
        span: Range<usize>,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Invalid syntax at {span:?}: {message}")]
    InvalidSyntax { span: Range<usize>, message: String },

    #[error("Lexer error at {span:?}: {message}")]
    LexError { span: Range<usize>, message: String },

    #[error("Mismatched closing tag at {span:?}: expected </{expected}>, found </{found}>")]
    MismatchedTag {
        span: Range<usize>,
        expected: String,
        found: String,
    },
}

impl ParseError {
    pub fn unexpected_token(
        span: Range<usize>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            expected: expected.into(),
        }
    }

    pub fn invalid_syntax(span: Range<usize>, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            span,
            message: message.into(),
        }
    }

    pub fn lex_error(span: Range<usize>, message: impl Into<String>) -> Self {
        Self::LexError {
            span,
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::InvalidSyntax { span, .. }
            | ParseError::LexError { span, .. }
            | ParseError::MismatchedTag { span, .. } => Some(span.clone()),
            ParseError::UnexpectedEof { .. } => None,
        }
    }

    /// Shift spans by `offset` (used when a sub-slice was parsed)
    pub fn offset(self, offset: usize) -> Self {
        let shift = |span: Range<usize>| span.start + offset..span.end + offset;
        match self {
            ParseError::UnexpectedToken {
                span,
                expected,
                found,
            } => ParseError::UnexpectedToken {
                span: shift(span),
                expected,
                found,
            },
            ParseError::InvalidSyntax { span, message } => ParseError::InvalidSyntax {
                span: shift(span),
                message,
            },
            ParseError::LexError { span, message } => ParseError::LexError {
                span: shift(span),
                message,
            },
            ParseError::MismatchedTag {
                span,
                expected,
                found,
            } => ParseError::MismatchedTag {
                span: shift(span),
                expected,
                found,
            },
            eof @ ParseError::UnexpectedEof { .. } => eof,
        }
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = error
        .span()
        .unwrap_or(source.len().saturating_sub(1)..source.len());

    let label = match error {
        ParseError::UnexpectedToken { expected, .. } => format!("expected {}", expected),
        ParseError::UnexpectedEof { expected } => format!("expected {}", expected),
        ParseError::InvalidSyntax { message, .. } => message.clone(),
        ParseError::LexError { message, .. } => message.clone(),
        ParseError::MismatchedTag { expected, .. } => format!("expected </{}>", expected),
    };

    let report = Report::build(ReportKind::Error, filename, span.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, span))
                .with_color(Color::Red)
                .with_message(label),
        )
        .finish();

    let mut output = Vec::new();
    if report
        .write((filename, Source::from(source)), &mut output)
        .is_err()
    {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}
