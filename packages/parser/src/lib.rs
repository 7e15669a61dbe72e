//! Element model and markup parser for the JSX editor.
//!
//! Source text goes in, an `Arc`-shared `ParsedElement` tree comes out:
//!
//! ```text
//! source ──► find_markup_start ──► tokenize (tag / content modes)
//!                                        │
//!                                        ▼
//!                      Parser ──► ParsedElement { id, type, children… }
//!                                 + function body (code before `return`)
//! ```

pub mod ast;
pub mod error;
pub mod expression;
pub mod id_generator;
pub mod imports;
pub mod parser;
pub mod tokenizer;

pub use ast::{
    AnimationConfig, AnimationKind, AnimationTrigger, ComponentInfo, ImportType, Node,
    ParsedElement, Repeat, FRAGMENT_TYPE, ROOT_ID,
};
#[cfg(feature = "pretty-errors")]
pub use error::format_error;
pub use error::{ParseError, ParseResult};
pub use expression::{parse_expression, Expr};
pub use id_generator::{get_document_seed, IdGenerator};
pub use imports::{is_component_tag, ImportSpec, KnownImports};
pub use parser::{
    parse, parse_with_generator, parse_with_imports, ParseOutput, Parser, NUMERIC_ATTRIBUTES,
};
pub use tokenizer::{tokenize, Token};
