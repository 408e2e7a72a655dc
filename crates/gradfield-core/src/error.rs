use thiserror::Error;

/// Configuration failures. All are detected before any lattice is built or
/// worker spawned, so a failed call never leaves a partial field behind.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions { width: usize, height: usize, reason: String },

    #[error("invalid cell size {cell_size} for a {width}x{height} field")]
    InvalidCellSize { cell_size: usize, width: usize, height: usize },

    #[error("invalid octave configuration: {0}")]
    InvalidOctaveConfig(String),

    #[error("worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("malformed generator configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FieldError>;
