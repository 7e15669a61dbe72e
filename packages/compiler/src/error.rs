use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Error, Debug, Clone)]
pub enum CompileError {
    /// Source could not be lowered into a program
    #[error("Transform failed: {0}")]
    Transform(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Compile endpoint answered with a failure status
    #[error("Endpoint returned {status}: {message}")]
    Endpoint { status: u16, message: String },

    #[error("Compile worker is not running")]
    WorkerUnavailable,

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<jsxlab_parser::ParseError> for CompileError {
    fn from(err: jsxlab_parser::ParseError) -> Self {
        CompileError::Transform(err.to_string())
    }
}

impl From<serde_json::Error> for CompileError {
    fn from(err: serde_json::Error) -> Self {
        CompileError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for CompileError {
    fn from(err: reqwest::Error) -> Self {
        CompileError::Network(err.to_string())
    }
}
