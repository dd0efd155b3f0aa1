// crates/cli/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] keyed_stats_engine::error::EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
