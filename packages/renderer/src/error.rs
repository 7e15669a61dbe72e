use thiserror::Error;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Not a local, not in the bindings allow-list, not a global
    #[error("Unknown identifier '{name}'")]
    UnknownIdentifier { name: String },

    #[error("Invalid program: {0}")]
    InvalidProgram(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// A host function or local initializer failed while building the tree
    #[error("Construction failed: {0}")]
    Construction(String),
}

impl EvalError {
    pub fn unknown(name: impl Into<String>) -> Self {
        EvalError::UnknownIdentifier { name: name.into() }
    }
}

impl From<jsxlab_compiler::CompileError> for EvalError {
    fn from(err: jsxlab_compiler::CompileError) -> Self {
        EvalError::InvalidProgram(err.to_string())
    }
}
