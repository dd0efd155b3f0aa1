use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no input files specified and nothing waiting at stdin")]
    EmptyInput,

    #[error("invalid field name/offset specified: {0}")]
    FieldNotFound(String),

    #[error("failed to read input '{path}': {source}")]
    InputRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: invalid date value '{value}'")]
    InvalidDate { line: u64, value: String },

    #[error("invalid count value '{0}' in merge input")]
    InvalidCount(String),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
