//! Error types for the editor

use jsxlab_parser::ParseError;
use thiserror::Error;

use crate::mutations::MutationError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Nothing to {0}")]
    EmptyHistory(&'static str),
}
