use thiserror::Error;

/// Application-level error type shared by the pipeline and the rendering path.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Template field '{0}' is missing from the supplied values")]
    MissingField(String),

    #[error("Template field '{0}' has the wrong shape: {1}")]
    FieldType(String, String),

    #[error("No fenced `{0}` block found in the document")]
    BlockNotFound(String),

    #[error("Compilation failed: {0}")]
    Compilation(String),

    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
